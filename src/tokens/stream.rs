//! Token streams as returned by the expression tokenizer.
//!
//! The wire form is the LSP semantic-token encoding: a flat sequence of
//! 5-tuples `[delta_line, delta_start, length, token_type, modifiers]`.
//! `delta_start` is relative to the previous token when both sit on the same
//! line, otherwise it is the column on the new line.

use serde::{Deserialize, Serialize};

/// Index of the start-offset field of the first tuple
pub const START_OFFSET_INDEX: usize = 1;

/// Number of `u32`s per encoded token
pub const TUPLE_LEN: usize = 5;

/// Token type legend shared with the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Variable,
    Function,
    Parameter,
    Property,
    Type,
    Literal,
    Keyword,
    Operator,
    Other(u32),
}

impl TokenKind {
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => TokenKind::Variable,
            1 => TokenKind::Function,
            2 => TokenKind::Parameter,
            3 => TokenKind::Property,
            4 => TokenKind::Type,
            5 => TokenKind::Literal,
            6 => TokenKind::Keyword,
            7 => TokenKind::Operator,
            n => TokenKind::Other(n),
        }
    }

    pub fn index(self) -> u32 {
        match self {
            TokenKind::Variable => 0,
            TokenKind::Function => 1,
            TokenKind::Parameter => 2,
            TokenKind::Property => 3,
            TokenKind::Type => 4,
            TokenKind::Literal => 5,
            TokenKind::Keyword => 6,
            TokenKind::Operator => 7,
            TokenKind::Other(n) => n,
        }
    }

    /// Whether an inline chip is drawn for this kind
    pub fn is_chip(self) -> bool {
        matches!(
            self,
            TokenKind::Variable
                | TokenKind::Function
                | TokenKind::Parameter
                | TokenKind::Property
                | TokenKind::Type
        )
    }

    /// Markup tag name used by the preview renderer
    pub fn tag(self) -> &'static str {
        match self {
            TokenKind::Variable => "variable",
            TokenKind::Function => "function",
            TokenKind::Parameter => "parameter",
            TokenKind::Property => "property",
            TokenKind::Type => "type",
            TokenKind::Literal => "literal",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Other(_) => "other",
        }
    }
}

/// A decoded token in absolute char offsets of the displayed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub length: usize,
    pub modifiers: u32,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, length: usize) -> Self {
        Self {
            kind,
            start,
            length,
            modifiers: 0,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end()
    }
}

/// Flat relative-encoded token stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenStream(pub Vec<u32>);

impl TokenStream {
    pub fn new(data: Vec<u32>) -> Self {
        Self(data)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Shift the stream so offsets address the prefix-stripped text.
    ///
    /// Only the leading tuple carries an absolute column on the first line;
    /// every later token is relative to it or sits on a later line. A
    /// leading token below the first line has no prefix before it.
    pub fn adjust_for_prefix(&mut self, prefix_len: usize) {
        if prefix_len == 0 || self.0.len() <= START_OFFSET_INDEX || self.0[0] != 0 {
            return;
        }
        let prefix = u32::try_from(prefix_len).unwrap_or(u32::MAX);
        self.0[START_OFFSET_INDEX] = self.0[START_OFFSET_INDEX].saturating_sub(prefix);
    }

    /// Decode into absolute char offsets over `text`.
    ///
    /// Tokens that fall outside `text` (stale streams) are dropped; trailing
    /// partial tuples are ignored.
    pub fn decode(&self, text: &str) -> Vec<Token> {
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(
                text.chars()
                    .enumerate()
                    .filter(|(_, c)| *c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        let total = text.chars().count();

        let mut tokens = Vec::with_capacity(self.0.len() / TUPLE_LEN);
        let mut line = 0usize;
        let mut column = 0usize;
        for tuple in self.0.chunks_exact(TUPLE_LEN) {
            let (delta_line, delta_start) = (tuple[0] as usize, tuple[1] as usize);
            if delta_line > 0 {
                line += delta_line;
                column = delta_start;
            } else {
                column += delta_start;
            }
            let Some(&line_start) = line_starts.get(line) else {
                break;
            };
            let start = line_start + column;
            let length = tuple[2] as usize;
            if start + length > total {
                continue;
            }
            tokens.push(Token {
                kind: TokenKind::from_index(tuple[3]),
                start,
                length,
                modifiers: tuple[4],
            });
        }
        tokens
    }

    /// Encode absolute tokens (sorted by start) over `text`
    pub fn encode(tokens: &[Token], text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut data = Vec::with_capacity(tokens.len() * TUPLE_LEN);
        let (mut prev_line, mut prev_col) = (0usize, 0usize);
        let (mut line, mut col, mut at) = (0usize, 0usize, 0usize);
        for token in tokens {
            while at < token.start && at < chars.len() {
                if chars[at] == '\n' {
                    line += 1;
                    col = 0;
                } else {
                    col += 1;
                }
                at += 1;
            }
            let delta_line = line - prev_line;
            let delta_start = if delta_line == 0 { col - prev_col } else { col };
            data.extend([
                delta_line as u32,
                delta_start as u32,
                token.length as u32,
                token.kind.index(),
                token.modifiers,
            ]);
            prev_line = line;
            prev_col = col;
        }
        Self(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_relative_same_line() {
        // "a ${x} ${y}" with x at 4 and y at 9
        let stream = TokenStream::new(vec![0, 4, 1, 0, 0, 0, 5, 1, 0, 0]);
        let tokens = stream.decode("a ${x} ${y}");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].start, 4);
        assert_eq!(tokens[1].start, 9);
    }

    #[test]
    fn test_decode_across_lines() {
        let stream = TokenStream::new(vec![0, 1, 2, 1, 0, 1, 3, 2, 0, 0]);
        let tokens = stream.decode("xab\nzzzcd");
        assert_eq!(tokens[0].start, 1);
        assert_eq!(tokens[0].kind, TokenKind::Function);
        assert_eq!(tokens[1].start, 7);
    }

    #[test]
    fn test_decode_drops_out_of_range() {
        let stream = TokenStream::new(vec![0, 10, 3, 0, 0]);
        assert!(stream.decode("short").is_empty());
    }

    #[test]
    fn test_adjust_for_prefix_subtracts_from_start_field() {
        let mut stream = TokenStream::new(vec![0, 12, 4, 0, 0]);
        stream.adjust_for_prefix(8);
        assert_eq!(stream.as_slice()[START_OFFSET_INDEX], 4);
    }

    #[test]
    fn test_adjust_for_prefix_skips_leading_token_on_later_line() {
        let mut stream = TokenStream::new(vec![1, 3, 7, 0, 0]);
        stream.adjust_for_prefix(8);
        assert_eq!(stream.as_slice(), &[1, 3, 7, 0, 0]);
    }

    #[test]
    fn test_adjust_for_prefix_short_stream_untouched() {
        let mut stream = TokenStream::new(vec![3]);
        stream.adjust_for_prefix(1);
        assert_eq!(stream.as_slice(), &[3]);
    }

    #[test]
    fn test_encode_matches_decode() {
        let text = "one ${a}\n${b} two";
        let tokens = vec![
            Token::new(TokenKind::Variable, 6, 1),
            Token::new(TokenKind::Variable, 11, 1),
        ];
        let stream = TokenStream::encode(&tokens, text);
        assert_eq!(stream.decode(text), tokens);
    }
}
