//! Readable text for script elements.
//!
//! The `readable` attribute decides what a node contributes to the flat
//! text. A value starting with `_` is a set of underscore-separated
//! instructions drawn from `tag`, `desc` and `body`; any other value is a
//! literal caption shown instead of the node's text.

use crate::types::{DESC_ATTR, Node, READABLE_ATTR};

/// Appended to bodies rendered from the node text.
pub const TEXT_BODY_SEPARATOR: &str = "\n\n";
/// Appended to literal captions.
pub const LITERAL_BODY_SEPARATOR: &str = "\n";
const HEADER_SEPARATOR: &str = "\n\n";
const INSTRUCTION_PREFIX: char = '_';

/// Where a rendered body came from, and so where an edited body goes back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodySource {
    /// `body` instruction: the node's text.
    Text,
    /// Literal `readable` value.
    Literal,
    /// Instructions without `body`: the body is always empty when rendered.
    None,
}

impl BodySource {
    pub fn separator(self) -> &'static str {
        match self {
            BodySource::Text => TEXT_BODY_SEPARATOR,
            BodySource::Literal => LITERAL_BODY_SEPARATOR,
            BodySource::None => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadableSpec<'a> {
    Literal(&'a str),
    Instructions { tag: bool, desc: bool, body: bool },
}

impl<'a> ReadableSpec<'a> {
    pub fn parse(value: &'a str) -> Self {
        let Some(rest) = value.strip_prefix(INSTRUCTION_PREFIX) else {
            return ReadableSpec::Literal(value);
        };
        let (mut tag, mut desc, mut body) = (false, false, false);
        for token in rest.split(INSTRUCTION_PREFIX) {
            match token {
                "tag" => tag = true,
                "desc" => desc = true,
                "body" => body = true,
                // unknown instructions are reserved for newer formats
                _ => {}
            }
        }
        ReadableSpec::Instructions { tag, desc, body }
    }

    pub fn of(node: &'a Node) -> Option<Self> {
        node.attr(READABLE_ATTR).map(Self::parse)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Readable {
    pub header: String,
    pub body: String,
    pub source: BodySource,
}

/// Resolve the header and body a node contributes to the flat text.
///
/// `None` means the node is not readable and contributes nothing.
pub fn resolve(node: &Node) -> Option<Readable> {
    let readable = match ReadableSpec::of(node)? {
        ReadableSpec::Literal(caption) => Readable {
            header: String::new(),
            body: format!("{caption}{LITERAL_BODY_SEPARATOR}"),
            source: BodySource::Literal,
        },
        ReadableSpec::Instructions { tag, desc, body } => {
            let header = match (tag, desc) {
                (false, false) => String::new(),
                (true, false) => format!("[{}]{HEADER_SEPARATOR}", capitalize(node.tag())),
                (false, true) => format!("[{}]{HEADER_SEPARATOR}", description(node)),
                (true, true) => format!(
                    "[{} - {}]{HEADER_SEPARATOR}",
                    capitalize(node.tag()),
                    description(node)
                ),
            };
            if body {
                Readable {
                    header,
                    body: format!("{}{TEXT_BODY_SEPARATOR}", node.text().unwrap_or_default()),
                    source: BodySource::Text,
                }
            } else {
                Readable {
                    header,
                    body: String::new(),
                    source: BodySource::None,
                }
            }
        }
    };
    Some(readable)
}

/// Short label for outline views: the literal caption, the header without
/// its brackets, or the capitalized tag.
pub fn outline_label(node: &Node) -> String {
    match ReadableSpec::of(node) {
        Some(ReadableSpec::Literal(caption)) => caption.to_string(),
        Some(ReadableSpec::Instructions { .. }) => {
            let header = resolve(node).map(|r| r.header).unwrap_or_default();
            let label = header.trim_end().trim_start_matches('[').trim_end_matches(']');
            if label.is_empty() {
                capitalize(node.tag())
            } else {
                label.to_string()
            }
        }
        None => capitalize(node.tag()),
    }
}

fn description(node: &Node) -> &str {
    node.attr(DESC_ATTR).unwrap_or_default()
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
