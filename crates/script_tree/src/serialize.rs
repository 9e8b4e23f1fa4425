//! Write a script tree back out as indented XML.
//!
//! Children go on their own lines with two spaces per level. Leaf text is
//! written verbatim so reading the output back yields the same text; the
//! leading text of an element with children is written before its first
//! child and picks up no indentation on reload.

use crate::entities::{escape_attr, escape_text};
use crate::types::Node;

const INDENT: &str = "  ";

pub fn to_xml(root: &Node) -> String {
    let mut out = String::new();
    write_node(root, 0, &mut out);
    out.push('\n');
    out
}

fn write_node(node: &Node, depth: usize, out: &mut String) {
    out.push('<');
    out.push_str(node.tag());
    for (name, value) in node.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }

    let text = node.text();
    if node.children().is_empty() {
        match text {
            None => out.push_str(" />"),
            Some(text) => {
                out.push('>');
                out.push_str(&escape_text(text));
                close(node, out);
            }
        }
        return;
    }

    out.push('>');
    if let Some(text) = text {
        out.push_str(&escape_text(text));
    }
    for child in node.children() {
        out.push('\n');
        push_indent(depth + 1, out);
        write_node(child, depth + 1, out);
    }
    out.push('\n');
    push_indent(depth, out);
    close(node, out);
}

fn close(node: &Node, out: &mut String) {
    out.push_str("</");
    out.push_str(node.tag());
    out.push('>');
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
