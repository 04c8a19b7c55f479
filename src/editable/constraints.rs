//! Edit constraints for the editing engine.
//!
//! Constraints define what a transaction may do to the document in a given
//! editing context. A transaction that breaks one is rejected whole.

/// Character filter function type. Returns true if the character is allowed.
pub type CharFilter = fn(char) -> bool;

/// Whole-document filter applied to the document a transaction would produce.
pub type DocFilter = fn(&str) -> bool;

/// Constraints that limit what a transaction may produce.
#[derive(Debug, Clone)]
pub struct EditConstraints {
    /// Allow newlines in inserted text
    pub allow_multiline: bool,

    /// Enable undo/redo tracking
    pub enable_undo: bool,

    /// Maximum undo depth
    pub undo_depth: usize,

    /// Maximum length in characters (None = unlimited)
    pub max_length: Option<usize>,

    /// Character filter (None = all characters allowed)
    pub char_filter: Option<CharFilter>,

    /// Resulting-document filter (None = any document allowed)
    pub doc_filter: Option<DocFilter>,
}

impl Default for EditConstraints {
    fn default() -> Self {
        Self {
            allow_multiline: true,
            enable_undo: true,
            undo_depth: 200,
            max_length: None,
            char_filter: None,
            doc_filter: None,
        }
    }
}

impl EditConstraints {
    /// Multi-line prompt/markdown editing
    pub fn multiline() -> Self {
        Self::default()
    }

    /// Single-line expression input
    pub fn single_line() -> Self {
        Self {
            allow_multiline: false,
            ..Self::default()
        }
    }

    /// Decimal-number input: every resulting document must pass `doc_filter`
    pub fn numeric(doc_filter: DocFilter) -> Self {
        Self {
            allow_multiline: false,
            doc_filter: Some(doc_filter),
            ..Self::default()
        }
    }

    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.undo_depth = depth;
        self
    }

    /// Check if inserted text passes the character-level rules
    pub fn allows_insert(&self, text: &str) -> bool {
        text.chars().all(|ch| {
            if ch == '\n' && !self.allow_multiline {
                return false;
            }
            match self.char_filter {
                Some(filter) => filter(ch),
                None => true,
            }
        })
    }

    /// Check if a resulting document is acceptable
    pub fn allows_document(&self, doc: &str) -> bool {
        if let Some(max) = self.max_length {
            if doc.chars().count() > max {
                return false;
            }
        }
        match self.doc_filter {
            Some(filter) => filter(doc),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_only(doc: &str) -> bool {
        doc.chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_single_line_rejects_newline() {
        let c = EditConstraints::single_line();
        assert!(c.allows_insert("abc"));
        assert!(!c.allows_insert("a\nb"));
    }

    #[test]
    fn test_numeric_doc_filter() {
        let c = EditConstraints::numeric(digits_only);
        assert!(c.allows_document("123"));
        assert!(!c.allows_document("12a"));
    }

    #[test]
    fn test_max_length() {
        let c = EditConstraints {
            max_length: Some(3),
            ..EditConstraints::default()
        };
        assert!(c.allows_document("abc"));
        assert!(!c.allows_document("abcd"));
    }
}
