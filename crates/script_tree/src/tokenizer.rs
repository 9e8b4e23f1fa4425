//! Small XML tokenizer for `.cscr` documents.
//!
//! Covers what script files use: elements, attributes in single or double
//! quotes, character references, comments, CDATA sections. Declarations,
//! processing instructions and doctypes are skipped. Tag and attribute names
//! are case-sensitive and may use ASCII `[A-Za-z0-9:_.-]` plus any non-ASCII
//! character.
//!
//! Line endings are normalized to `\n` before scanning, so token positions
//! are byte offsets into the normalized input.

use crate::entities::decode_entities;
use crate::error::{ParseError, ParseErrorCode};
use memchr::{memchr, memmem};
use std::borrow::Cow;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";
const PI_START: &str = "<?";
const PI_END: &str = "?>";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
    Comment,
}

/// Tokens paired with the byte offset where each one starts.
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<(usize, Token)>,
    len: usize,
}

impl TokenStream {
    /// Length of the scanned input, the position reported for end-of-input errors.
    pub fn input_len(&self) -> usize {
        self.len
    }
}

impl IntoIterator for TokenStream {
    type Item = (usize, Token);
    type IntoIter = std::vec::IntoIter<(usize, Token)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

fn normalize_newlines(s: &str) -> Cow<'_, str> {
    if memchr(b'\r', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace("\r\n", "\n").replace('\r', "\n"))
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.') || b >= 0x80
}

/// Whether `name` reads back as a single tag or attribute name.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_name_byte)
}

pub fn tokenize(input: &str) -> Result<TokenStream, ParseError> {
    let normalized = normalize_newlines(input);
    let input: &str = &normalized;
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;

    let fail = |code, position| ParseError { code, position };
    // Slice endpoints are only ever taken at ASCII structural bytes or after
    // whole runs of name bytes, so they stay on char boundaries.
    let find_from = |from: usize, needle: &str| {
        memmem::find(&bytes[from..], needle.as_bytes()).map(|rel| from + rel)
    };

    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            out.push((start, Token::Text(decode_entities(&input[start..i]).into_owned())));
            continue;
        }

        let rest = &input[i..];
        if rest.starts_with(COMMENT_START) {
            let body = i + COMMENT_START.len();
            let end = find_from(body, COMMENT_END)
                .ok_or_else(|| fail(ParseErrorCode::UnexpectedEof, i))?;
            out.push((i, Token::Comment));
            i = end + COMMENT_END.len();
            continue;
        }
        if rest.starts_with(CDATA_START) {
            let body = i + CDATA_START.len();
            let end = find_from(body, CDATA_END)
                .ok_or_else(|| fail(ParseErrorCode::UnexpectedEof, i))?;
            out.push((i, Token::Text(input[body..end].to_string())));
            i = end + CDATA_END.len();
            continue;
        }
        if rest.starts_with(PI_START) {
            let end = find_from(i + PI_START.len(), PI_END)
                .ok_or_else(|| fail(ParseErrorCode::UnexpectedEof, i))?;
            i = end + PI_END.len();
            continue;
        }
        if rest.starts_with("<!") {
            // doctype and other declarations carry nothing a script needs
            let end = memchr(b'>', &bytes[i..])
                .ok_or_else(|| fail(ParseErrorCode::UnterminatedTag, i))?;
            i += end + 1;
            continue;
        }

        if rest.starts_with("</") {
            let name_start = i + 2;
            let mut j = name_start;
            while j < len && is_name_byte(bytes[j]) {
                j += 1;
            }
            if j == name_start {
                return Err(fail(ParseErrorCode::UnterminatedTag, i));
            }
            let name = input[name_start..j].to_string();
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j >= len || bytes[j] != b'>' {
                return Err(fail(ParseErrorCode::UnterminatedTag, i));
            }
            out.push((i, Token::EndTag(name)));
            i = j + 1;
            continue;
        }

        let (token, next) = start_tag(input, i)?;
        out.push((i, token));
        i = next;
    }

    log::trace!(target: "script.load", "tokenized {} tokens from {len} bytes", out.len());
    Ok(TokenStream { tokens: out, len })
}

/// Scan a start tag beginning at `tag_start` (which points at `<`).
fn start_tag(input: &str, tag_start: usize) -> Result<(Token, usize), ParseError> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let unterminated = ParseError {
        code: ParseErrorCode::UnterminatedTag,
        position: tag_start,
    };

    let name_start = tag_start + 1;
    let mut k = name_start;
    while k < len && is_name_byte(bytes[k]) {
        k += 1;
    }
    if k == name_start {
        return Err(unterminated);
    }
    let name = input[name_start..k].to_string();
    let mut attributes = Vec::new();

    loop {
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len {
            return Err(unterminated);
        }
        match bytes[k] {
            b'>' => {
                let token = Token::StartTag {
                    name,
                    attributes,
                    self_closing: false,
                };
                return Ok((token, k + 1));
            }
            b'/' if bytes.get(k + 1) == Some(&b'>') => {
                let token = Token::StartTag {
                    name,
                    attributes,
                    self_closing: true,
                };
                return Ok((token, k + 2));
            }
            _ => {}
        }

        let attr_start = k;
        while k < len && is_name_byte(bytes[k]) {
            k += 1;
        }
        if k == attr_start {
            return Err(unterminated);
        }
        let attr_name = input[attr_start..k].to_string();

        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len || bytes[k] != b'=' {
            // valueless attribute, kept as empty
            attributes.push((attr_name, String::new()));
            continue;
        }
        k += 1;
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }

        let value = if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
            let quote = bytes[k];
            let value_start = k + 1;
            let close = memchr(quote, &bytes[value_start..]).ok_or(unterminated.clone())?;
            k = value_start + close + 1;
            normalize_attribute(&input[value_start..value_start + close])
        } else {
            let value_start = k;
            while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                if bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>') {
                    break;
                }
                k += 1;
            }
            decode_entities(&input[value_start..k]).into_owned()
        };
        attributes.push((attr_name, value));
    }
}

/// Literal whitespace in attribute values reads as a space; encoded line
/// breaks (`&#10;`) survive because references are decoded afterwards.
fn normalize_attribute(raw: &str) -> String {
    let spaced: Cow<'_, str> = if raw.bytes().any(|b| matches!(b, b'\n' | b'\t')) {
        Cow::Owned(raw.replace(['\n', '\t'], " "))
    } else {
        Cow::Borrowed(raw)
    };
    decode_entities(&spaced).into_owned()
}
