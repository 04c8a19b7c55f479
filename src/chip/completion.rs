//! Completion items and fuzzy filtering for the helper pane.

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Function,
    #[default]
    Variable,
    Field,
    Parameter,
    Type,
    Keyword,
    Value,
}

/// A host-supplied completion entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: String,
    /// Raw value handed to the helper-value rule
    pub value: String,
    #[serde(default)]
    pub kind: CompletionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind,
            detail: None,
        }
    }
}

/// Filter and rank `items` by fuzzy match of `query` against their labels.
///
/// An empty query keeps the host's order.
pub fn filter_completions<'a>(items: &'a [CompletionItem], query: &str) -> Vec<&'a CompletionItem> {
    if query.is_empty() {
        return items.iter().collect();
    }
    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
    let mut buf = Vec::new();

    let mut scored: Vec<(u32, usize, &CompletionItem)> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let haystack = Utf32Str::new(&item.label, &mut buf);
            pattern.score(haystack, &mut matcher).map(|s| (s, i, item))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<CompletionItem> {
        vec![
            CompletionItem::new("payload", "payload", CompletionKind::Variable),
            CompletionItem::new("toUpper()", "toUpper()", CompletionKind::Function),
            CompletionItem::new("properties", "properties", CompletionKind::Variable),
        ]
    }

    #[test]
    fn test_empty_query_keeps_order() {
        let items = items();
        let out = filter_completions(&items, "");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].label, "payload");
    }

    #[test]
    fn test_fuzzy_filter() {
        let items = items();
        let out = filter_completions(&items, "upr");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "toUpper()");
    }
}
