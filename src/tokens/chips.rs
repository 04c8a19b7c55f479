//! Chip layout: which spans of the displayed text render as inline widgets.

use std::ops::Range;

use super::stream::{Token, TokenKind};

/// An inline widget over a token span (char offsets of the displayed text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub range: Range<usize>,
    pub kind: TokenKind,
    pub text: String,
}

/// Lay out chips for `tokens` over `text`, in document order.
///
/// Non-chip kinds, empty tokens, tokens past the end of the text and tokens
/// overlapping an earlier chip are skipped.
pub fn layout_chips(text: &str, tokens: &[Token]) -> Vec<Chip> {
    let chars: Vec<char> = text.chars().collect();
    let mut sorted: Vec<&Token> = tokens.iter().filter(|t| t.kind.is_chip()).collect();
    sorted.sort_by_key(|t| t.start);

    let mut chips: Vec<Chip> = Vec::with_capacity(sorted.len());
    for token in sorted {
        if token.length == 0 || token.end() > chars.len() {
            continue;
        }
        if chips.last().is_some_and(|prev| prev.range.end > token.start) {
            continue;
        }
        chips.push(Chip {
            range: token.start..token.end(),
            kind: token.kind,
            text: chars[token.start..token.end()].iter().collect(),
        });
    }
    chips
}

/// The chip whose span contains `offset` (edges inclusive)
pub fn chip_at(chips: &[Chip], offset: usize) -> Option<&Chip> {
    chips
        .iter()
        .find(|c| offset >= c.range.start && offset <= c.range.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_skips_non_chip_and_out_of_range() {
        let text = "Hello ${name}";
        let tokens = vec![
            Token::new(TokenKind::Variable, 8, 4),
            Token::new(TokenKind::Keyword, 0, 5),
            Token::new(TokenKind::Function, 20, 3),
        ];
        let chips = layout_chips(text, &tokens);
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].text, "name");
        assert_eq!(chips[0].range, 8..12);
    }

    #[test]
    fn test_layout_skips_overlaps() {
        let tokens = vec![
            Token::new(TokenKind::Function, 0, 5),
            Token::new(TokenKind::Variable, 2, 2),
        ];
        let chips = layout_chips("abcdefg", &tokens);
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].kind, TokenKind::Function);
    }

    #[test]
    fn test_chip_at_edges() {
        let chips = layout_chips("x ${ab}", &[Token::new(TokenKind::Variable, 4, 2)]);
        assert!(chip_at(&chips, 4).is_some());
        assert!(chip_at(&chips, 6).is_some());
        assert!(chip_at(&chips, 1).is_none());
    }
}
