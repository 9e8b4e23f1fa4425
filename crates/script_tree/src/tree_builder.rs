//! Build a [`Node`] tree from a token stream.
//!
//! XML is not error-tolerant the way HTML is: end tags must match the open
//! element exactly and the document has exactly one root. Comments are
//! dropped. Text that follows a child element (XML "tail" text) has no slot
//! in the script model and is dropped with a debug log unless it is
//! whitespace. In elements that have children, trailing whitespace of the
//! leading text is indentation and is removed; whitespace-only leading text
//! becomes `None`.
//!
//! Elements may nest at most [`MAX_DEPTH`] levels, the root being level 1.

use crate::error::{ParseError, ParseErrorCode};
use crate::tokenizer::{Token, TokenStream};
use crate::types::Node;

pub const MAX_DEPTH: usize = 256;

struct TreeBuilder {
    open_elements: Vec<Node>,
    root: Option<Node>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            open_elements: Vec::new(),
            root: None,
        }
    }

    fn attach(&mut self, node: Node, position: usize) -> Result<(), ParseError> {
        match self.open_elements.last_mut() {
            Some(parent) => parent.children_mut().push(node),
            None if self.root.is_some() => {
                return Err(ParseError {
                    code: ParseErrorCode::MultipleRoots,
                    position,
                });
            }
            None => self.root = Some(node),
        }
        Ok(())
    }

    fn text(&mut self, text: String, position: usize) -> Result<(), ParseError> {
        let blank = text.trim().is_empty();
        let Some(parent) = self.open_elements.last_mut() else {
            if blank {
                return Ok(());
            }
            return Err(ParseError {
                code: ParseErrorCode::TextOutsideRoot,
                position,
            });
        };

        if !parent.children().is_empty() {
            if !blank {
                log::debug!(
                    target: "script.load",
                    "dropping text after a child of <{}> at byte {position}",
                    parent.tag()
                );
            }
            return Ok(());
        }

        let joined = match parent.text() {
            Some(existing) => format!("{existing}{text}"),
            None => text,
        };
        parent.set_text(Some(joined));
        Ok(())
    }

    fn close(&mut self, name: &str, position: usize) -> Result<(), ParseError> {
        let Some(mut node) = self.open_elements.pop() else {
            return Err(ParseError {
                code: ParseErrorCode::UnmatchedEndTag,
                position,
            });
        };
        if node.tag() != name {
            return Err(ParseError {
                code: ParseErrorCode::MismatchedEndTag,
                position,
            });
        }
        if !node.children().is_empty() {
            let text = node
                .text()
                .map(str::trim_end)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            node.set_text(text);
        }
        self.attach(node, position)
    }

    fn finish(self, input_len: usize) -> Result<Node, ParseError> {
        if !self.open_elements.is_empty() {
            return Err(ParseError {
                code: ParseErrorCode::UnexpectedEof,
                position: input_len,
            });
        }
        self.root.ok_or(ParseError {
            code: ParseErrorCode::MissingRoot,
            position: input_len,
        })
    }
}

pub fn build_tree(stream: TokenStream) -> Result<Node, ParseError> {
    let input_len = stream.input_len();
    let mut builder = TreeBuilder::new();

    for (position, token) in stream {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if builder.open_elements.is_empty() && builder.root.is_some() {
                    return Err(ParseError {
                        code: ParseErrorCode::MultipleRoots,
                        position,
                    });
                }
                if builder.open_elements.len() >= MAX_DEPTH {
                    return Err(ParseError {
                        code: ParseErrorCode::TooDeep,
                        position,
                    });
                }
                let node = Node::with_attributes(name, attributes);
                if self_closing {
                    builder.attach(node, position)?;
                } else {
                    builder.open_elements.push(node);
                }
            }
            Token::EndTag(name) => builder.close(&name, position)?,
            Token::Text(text) => builder.text(text, position)?,
            Token::Comment => {}
        }
    }

    builder.finish(input_len)
}
