//! XML character references: decoding on read, escaping on write.
//!
//! Decoding covers the five predefined XML entities and well-formed,
//! semicolon-terminated numeric references (`&#215;`, `&#xD7;`). Anything
//! else, including references to invalid scalar values, is kept verbatim so
//! a lenient read never loses characters.

use memchr::memchr;
use std::borrow::Cow;

const NAMED: &[(&[u8], char)] = &[
    (b"&amp;", '&'),
    (b"&lt;", '<'),
    (b"&gt;", '>'),
    (b"&quot;", '"'),
    (b"&apos;", '\''),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            let next = memchr(b'&', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            out.push_str(&s[i..next]);
            i = next;
            continue;
        }

        if let Some((pat, ch)) = NAMED.iter().find(|(pat, _)| bytes[i..].starts_with(pat)) {
            out.push(*ch);
            i += pat.len();
            continue;
        }

        if let Some((ch, consumed)) = numeric_reference(&s[i..]) {
            out.push(ch);
            i += consumed;
            continue;
        }

        out.push('&');
        i += 1;
    }

    Cow::Owned(out)
}

/// Decode a numeric reference at the start of `s`, returning the character
/// and the number of bytes consumed.
fn numeric_reference(s: &str) -> Option<(char, usize)> {
    let (digits_start, radix, max_digits) = if s.starts_with("&#x") || s.starts_with("&#X") {
        (3, 16, MAX_HEX_DIGITS)
    } else if s.starts_with("&#") {
        (2, 10, MAX_DEC_DIGITS)
    } else {
        return None;
    };

    let rest = &s.as_bytes()[digits_start..];
    let end = memchr(b';', &rest[..rest.len().min(max_digits + 1)])?;
    let digits = &s[digits_start..digits_start + end];
    if digits.is_empty() || !digits.bytes().all(|b| (b as char).is_digit(radix)) {
        return None;
    }
    let ch = u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)?;
    Some((ch, digits_start + end + 1))
}

/// Escape element text. Carriage returns are encoded so newline
/// normalization on read leaves them intact.
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    escape(s, false)
}

/// Escape a double-quoted attribute value. Line breaks and tabs are encoded
/// so attribute-value normalization on read leaves them intact.
pub(crate) fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s, true)
}

fn escape(s: &str, attribute: bool) -> Cow<'_, str> {
    let needs = |c: char| match c {
        '&' | '<' | '>' | '\r' => true,
        '"' | '\n' | '\t' => attribute,
        _ => false,
    };
    if !s.chars().any(needs) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' if attribute => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(decode_entities("no refs here"), Cow::Borrowed(_)));
        assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn decodes_predefined_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;clip&gt;"), "<clip>");
        assert_eq!(decode_entities("&quot;hi&quot; &apos;x&apos;"), "\"hi\" 'x'");
    }

    #[test]
    fn decodes_numeric_references() {
        assert_eq!(decode_entities("&#215;"), "×");
        assert_eq!(decode_entities("&#xD7;&#10;"), "×\n");
        assert_eq!(decode_entities("&#x10FFFF;"), "\u{10FFFF}");
    }

    #[test]
    fn keeps_unknown_and_malformed_references() {
        for s in [
            "&nbsp;",
            "&amp",
            "&#xZZ;",
            "&#xD800;",
            "&#x110000;",
            "&#11141111;",
            "&#;",
            "&#x;",
            "&#123",
            "&",
        ] {
            assert_eq!(decode_entities(s), s, "changed {s:?}");
        }
        assert_eq!(decode_entities("&#xZZ;&amp;"), "&#xZZ;&");
    }

    #[test]
    fn decoding_preserves_utf8_around_references() {
        assert_eq!(decode_entities("π &amp; σ — ok"), "π & σ — ok");
    }

    #[test]
    fn escaping_is_undone_by_decoding() {
        let text = "Fish & chips <now> \"quoted\"\n\tindent";
        assert_eq!(decode_entities(&escape_text(text)), text);
        assert_eq!(decode_entities(&escape_attr(text)), text);
        assert!(!escape_attr(text).contains('\n'));
        assert!(!escape_attr(text).contains('"'));
        assert_eq!(escape_text("a\r\nb"), "a&#13;\nb");
    }
}
