//! Utility modules

pub mod text;

pub use text::{char_byte_index, char_type, is_punctuation, last_non_space_before, CharType};
