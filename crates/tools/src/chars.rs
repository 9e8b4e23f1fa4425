//! Character-offset helpers.
//!
//! The flat script text is addressed in Unicode scalar values (`char`s), the
//! way a text surface reports cursor positions. Rust strings slice by byte, so
//! every offset has to be translated before it touches a `&str`.

/// Number of `char`s in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Translate a char offset into a byte offset.
///
/// `char_index == char_len(s)` maps to `s.len()`. Anything past the end is
/// `None`.
///
/// ```
/// use tools::byte_index;
///
/// let s = "a€b"; // '€' is 3 bytes
/// assert_eq!(byte_index(s, 0), Some(0));
/// assert_eq!(byte_index(s, 1), Some(1));
/// assert_eq!(byte_index(s, 2), Some(4));
/// assert_eq!(byte_index(s, 3), Some(5));
/// assert_eq!(byte_index(s, 4), None);
/// ```
pub fn byte_index(s: &str, char_index: usize) -> Option<usize> {
    if char_index == 0 {
        return Some(0);
    }
    let mut seen = 0usize;
    for (byte, _) in s.char_indices() {
        if seen == char_index {
            return Some(byte);
        }
        seen += 1;
    }
    (seen == char_index).then_some(s.len())
}

/// Slice `s` by a half-open char range.
///
/// Returns `None` if the range is inverted or runs past the end of `s`.
pub fn slice_chars(s: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = byte_index(s, start)?;
    // Resume from `from` so long buffers are only walked once.
    let to = from + byte_index(&s[from..], end - start)?;
    Some(&s[from..to])
}
