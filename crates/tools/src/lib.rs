pub mod chars;

pub use chars::{byte_index, char_len, slice_chars};
