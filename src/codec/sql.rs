//! SQL highlighting for the backtick SQL template mode (tree-sitter-sequel).

use std::ops::Range;

use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlHighlight {
    Keyword,
    String,
    Number,
    Comment,
    Identifier,
    Function,
}

/// A highlighted span in char offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSpan {
    pub range: Range<usize>,
    pub kind: SqlHighlight,
}

/// Reusable SQL highlighter. Parser construction is the expensive part.
pub struct SqlHighlighter {
    parser: Parser,
}

impl std::fmt::Debug for SqlHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlHighlighter").finish_non_exhaustive()
    }
}

impl SqlHighlighter {
    pub fn new() -> anyhow::Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_sequel::LANGUAGE.into())
            .map_err(|e| anyhow::anyhow!("failed to load SQL grammar: {e}"))?;
        Ok(Self { parser })
    }

    /// Highlight spans of `text`, sorted and non-overlapping
    pub fn highlight(&mut self, text: &str) -> Vec<SqlSpan> {
        let Some(tree) = self.parser.parse(text, None) else {
            return Vec::new();
        };
        let mut spans = Vec::new();
        collect(tree.root_node(), text, &mut spans);

        spans.sort_by_key(|s: &(Range<usize>, SqlHighlight)| s.0.start);
        let mut out: Vec<SqlSpan> = Vec::with_capacity(spans.len());
        for (bytes, kind) in spans {
            let range = byte_to_char(text, bytes.start)..byte_to_char(text, bytes.end);
            if out.last().is_some_and(|prev| prev.range.end > range.start) {
                continue;
            }
            out.push(SqlSpan { range, kind });
        }
        out
    }
}

fn classify(node: Node, text: &str) -> Option<SqlHighlight> {
    let kind = node.kind();
    match kind {
        "comment" | "marginalia" => Some(SqlHighlight::Comment),
        "identifier" => Some(SqlHighlight::Identifier),
        "invocation" => Some(SqlHighlight::Function),
        "literal" => {
            let literal = text.get(node.start_byte()..node.end_byte())?;
            if literal.starts_with('\'') || literal.starts_with('"') {
                Some(SqlHighlight::String)
            } else if literal.starts_with(|c: char| c.is_ascii_digit()) {
                Some(SqlHighlight::Number)
            } else {
                None
            }
        }
        _ if kind.starts_with("keyword_") => Some(SqlHighlight::Keyword),
        _ => None,
    }
}

fn collect(node: Node, text: &str, out: &mut Vec<(Range<usize>, SqlHighlight)>) {
    // Function calls: colour just the name, then keep walking the arguments
    if node.kind() == "invocation" {
        if let Some(name) = node.child(0) {
            out.push((name.start_byte()..name.end_byte(), SqlHighlight::Function));
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor).skip(1) {
            collect(child, text, out);
        }
        return;
    }
    if let Some(kind) = classify(node, text) {
        out.push((node.start_byte()..node.end_byte(), kind));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, text, out);
    }
}

fn byte_to_char(text: &str, byte: usize) -> usize {
    text.get(..byte.min(text.len()))
        .map(|s| s.chars().count())
        .unwrap_or_else(|| text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlights_keywords_and_strings() {
        let mut highlighter = SqlHighlighter::new().unwrap();
        let text = "SELECT name FROM users WHERE id = 'x'";
        let spans = highlighter.highlight(text);
        let chars: Vec<char> = text.chars().collect();
        let slice = |s: &SqlSpan| chars[s.range.clone()].iter().collect::<String>();

        assert!(spans
            .iter()
            .any(|s| s.kind == SqlHighlight::Keyword && slice(s) == "SELECT"));
        assert!(spans
            .iter()
            .any(|s| s.kind == SqlHighlight::String && slice(s) == "'x'"));
    }

    #[test]
    fn test_spans_do_not_overlap() {
        let mut highlighter = SqlHighlighter::new().unwrap();
        let spans = highlighter.highlight("SELECT count(*) FROM t -- note");
        for pair in spans.windows(2) {
            assert!(pair[0].range.end <= pair[1].range.start);
        }
    }
}
