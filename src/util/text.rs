//! Utility functions for text editing

/// Check if a character is a punctuation/symbol boundary (not whitespace)
pub fn is_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '/' | ':'
            | ','
            | '.'
            | '-'
            | '('
            | ')'
            | '{'
            | '}'
            | '['
            | ']'
            | ';'
            | '"'
            | '\''
            | '<'
            | '>'
            | '='
            | '+'
            | '*'
            | '&'
            | '|'
            | '!'
            | '@'
            | '#'
            | '$'
            | '%'
            | '^'
            | '~'
            | '`'
            | '\\'
            | '?'
    )
}

/// Character type for word selection and completion prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    /// Whitespace characters
    Whitespace,
    /// Alphanumeric characters and underscore
    WordChar,
    /// Punctuation and symbols
    Punctuation,
}

pub fn char_type(ch: char) -> CharType {
    if ch.is_whitespace() {
        CharType::Whitespace
    } else if is_punctuation(ch) {
        CharType::Punctuation
    } else {
        CharType::WordChar
    }
}

/// Byte index of the `char_idx`-th char (or `s.len()` past the end)
pub fn char_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Last non-whitespace char strictly before char offset `pos`
pub fn last_non_space_before(s: &str, pos: usize) -> Option<char> {
    let end = char_byte_index(s, pos);
    s[..end].chars().rev().find(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_type() {
        assert_eq!(char_type('a'), CharType::WordChar);
        assert_eq!(char_type('_'), CharType::WordChar);
        assert_eq!(char_type(' '), CharType::Whitespace);
        assert_eq!(char_type('$'), CharType::Punctuation);
    }

    #[test]
    fn test_char_byte_index_multibyte() {
        let s = "héllo";
        assert_eq!(char_byte_index(s, 2), 3);
        assert_eq!(char_byte_index(s, 99), s.len());
    }

    #[test]
    fn test_last_non_space_before() {
        assert_eq!(last_non_space_before("a + ", 4), Some('+'));
        assert_eq!(last_non_space_before("key:  x", 6), Some(':'));
        assert_eq!(last_non_space_before("   ", 3), None);
    }
}
