//! CodeEngine - the plain-text editing engine: rope document, selection,
//! token overlay and history, all updated through transactions.

use ropey::Rope;

use super::change::{apply_changes, map_pos, map_range, Change, StateEffect, Transaction};
use super::constraints::EditConstraints;
use super::cursor::Position;
use super::history::{EditHistory, HistoryEntry};
use super::selection::Selection;
use crate::tokens::Token;
use crate::util::{char_type, CharType};

/// A document line in char offsets (`to` excludes the line break)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo {
    /// 0-based line number
    pub number: usize,
    pub from: usize,
    pub to: usize,
    pub text: String,
}

/// What a dispatched transaction did, as seen by change listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub doc_changed: bool,
    pub selection_changed: bool,
    pub external: bool,
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct CodeEngine {
    doc: Rope,
    selection: Selection,
    tokens: Vec<Token>,
    constraints: EditConstraints,
    history: EditHistory,
    revision: u64,
}

impl CodeEngine {
    pub fn new(text: &str, constraints: EditConstraints) -> Self {
        let history = EditHistory::with_max_size(constraints.undo_depth);
        let doc = Rope::from_str(text);
        let end = doc.len_chars();
        Self {
            doc,
            selection: Selection::cursor(end),
            tokens: Vec::new(),
            constraints,
            history,
            revision: 0,
        }
    }

    pub fn doc(&self) -> &Rope {
        &self.doc
    }

    pub fn text(&self) -> String {
        self.doc.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.doc.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.len_chars() == 0
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_text(&self) -> String {
        let range = self.selection.range();
        self.doc.slice(range).to_string()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn constraints(&self) -> &EditConstraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: EditConstraints) {
        self.constraints = constraints;
    }

    pub fn can_undo(&self) -> bool {
        self.constraints.enable_undo && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.constraints.enable_undo && self.history.can_redo()
    }

    /// The line containing a char offset
    pub fn line_at(&self, offset: usize) -> LineInfo {
        let offset = offset.min(self.doc.len_chars());
        let number = self.doc.char_to_line(offset);
        self.line(number)
    }

    /// Line by 0-based number (clamped to the last line)
    pub fn line(&self, number: usize) -> LineInfo {
        let number = number.min(self.doc.len_lines().saturating_sub(1));
        let from = self.doc.line_to_char(number);
        let raw = self.doc.line(number).to_string();
        let text = raw.trim_end_matches(['\n', '\r']).to_string();
        let to = from + text.chars().count();
        LineInfo {
            number,
            from,
            to,
            text,
        }
    }

    /// Convert a char offset to (line, column)
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.doc.len_chars());
        let line = self.doc.char_to_line(offset);
        Position::new(line, offset - self.doc.line_to_char(line))
    }

    /// Apply a transaction. Returns `None` if the constraints reject it.
    pub fn dispatch(&mut self, tr: Transaction) -> Option<ChangeEvent> {
        let changes = tr.sorted_changes();
        let doc_changed = tr.doc_changed();

        let mut next_doc = self.doc.clone();
        let inverse = if doc_changed {
            if !tr.annotations.external
                && !changes.iter().all(|c| self.constraints.allows_insert(&c.insert))
            {
                tracing::debug!(event = ?tr.annotations.user_event, "insert rejected by constraints");
                return None;
            }
            let inverse = apply_changes(&mut next_doc, &changes);
            if !self.constraints.allows_document(&next_doc.to_string()) {
                tracing::debug!(event = ?tr.annotations.user_event, "transaction rejected by document filter");
                return None;
            }
            inverse
        } else {
            Vec::new()
        };

        let selection_before = self.selection;
        let selection_after = match tr.selection {
            Some(sel) => sel.clamp(next_doc.len_chars()),
            None => Selection::new(
                map_pos(self.selection.anchor, &changes, 1),
                map_pos(self.selection.head, &changes, 1),
            )
            .clamp(next_doc.len_chars()),
        };

        if doc_changed {
            self.doc = next_doc;
            self.revision += 1;
            self.tokens = self
                .tokens
                .iter()
                .filter_map(|t| {
                    map_range(t.start, t.end(), &changes).map(|(start, end)| Token {
                        start,
                        length: end - start,
                        ..t.clone()
                    })
                })
                .collect();

            if tr.annotations.add_to_history && self.constraints.enable_undo {
                self.history.push(HistoryEntry {
                    changes,
                    inverse,
                    selection_before,
                    selection_after,
                });
            }
        }
        self.selection = selection_after;

        for effect in tr.effects {
            match effect {
                StateEffect::SetTokens(tokens) => self.tokens = tokens,
            }
        }

        Some(ChangeEvent {
            doc_changed,
            selection_changed: selection_before != selection_after,
            external: tr.annotations.external,
            revision: self.revision,
        })
    }

    pub fn set_selection(&mut self, selection: Selection) -> Option<ChangeEvent> {
        self.dispatch(Transaction::select(selection))
    }

    /// Replace the selection with text (typing / paste)
    pub fn insert_text(&mut self, text: &str) -> Option<ChangeEvent> {
        let range = self.selection.range();
        let cursor = range.start + text.chars().count();
        self.dispatch(
            Transaction::new(vec![Change::replace(range.start, range.end, text)])
                .with_selection(Selection::cursor(cursor))
                .user_event("input"),
        )
    }

    /// Backspace: delete the selection or the char before the cursor
    pub fn delete_backward(&mut self) -> Option<ChangeEvent> {
        let range = self.selection.range();
        let (from, to) = if range.is_empty() {
            if range.start == 0 {
                return None;
            }
            (range.start - 1, range.start)
        } else {
            (range.start, range.end)
        };
        self.dispatch(
            Transaction::new(vec![Change::delete(from, to)])
                .with_selection(Selection::cursor(from))
                .user_event("delete.backward"),
        )
    }

    /// Delete the selection or the char after the cursor
    pub fn delete_forward(&mut self) -> Option<ChangeEvent> {
        let range = self.selection.range();
        let (from, to) = if range.is_empty() {
            if range.start >= self.doc.len_chars() {
                return None;
            }
            (range.start, range.start + 1)
        } else {
            (range.start, range.end)
        };
        self.dispatch(
            Transaction::new(vec![Change::delete(from, to)])
                .with_selection(Selection::cursor(from))
                .user_event("delete.forward"),
        )
    }

    pub fn select_all(&mut self) -> Option<ChangeEvent> {
        self.set_selection(Selection::new(0, self.doc.len_chars()))
    }

    /// The word (identifier-like run) ending at the cursor, for completion filtering
    pub fn word_before_cursor(&self) -> String {
        let head = self.selection.head;
        let line = self.line_at(head);
        let before: Vec<char> = line.text.chars().take(head - line.from).collect();
        let start = before
            .iter()
            .rposition(|c| char_type(*c) != CharType::WordChar)
            .map(|i| i + 1)
            .unwrap_or(0);
        before[start..].iter().collect()
    }

    pub fn undo(&mut self) -> bool {
        if !self.constraints.enable_undo {
            return false;
        }
        let Some(entry) = self.history.pop_undo() else {
            return false;
        };
        self.apply_history_step(&entry.inverse, entry.selection_before);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.constraints.enable_undo {
            return false;
        }
        let Some(entry) = self.history.pop_redo() else {
            return false;
        };
        self.apply_history_step(&entry.inverse, entry.selection_before);
        true
    }

    fn apply_history_step(&mut self, changes: &[Change], selection: Selection) {
        let mut sorted = changes.to_vec();
        sorted.sort_by_key(|c| (c.from, c.to));
        apply_changes(&mut self.doc, &sorted);
        self.tokens.retain(|t| map_range(t.start, t.end(), &sorted).is_some());
        self.revision += 1;
        self.selection = selection.clamp(self.doc.len_chars());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(text: &str) -> CodeEngine {
        CodeEngine::new(text, EditConstraints::multiline())
    }

    #[test]
    fn test_new_places_cursor_at_end() {
        let e = engine("hello");
        assert_eq!(e.selection(), Selection::cursor(5));
        assert_eq!(e.revision(), 0);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut e = engine("hello world");
        e.set_selection(Selection::new(0, 5));
        let event = e.insert_text("X").unwrap();
        assert!(event.doc_changed);
        assert_eq!(e.text(), "X world");
        assert_eq!(e.selection(), Selection::cursor(1));
        assert_eq!(e.revision(), 1);
    }

    #[test]
    fn test_undo_redo_restore_selection() {
        let mut e = engine("");
        e.insert_text("a");
        e.insert_text("b");
        assert_eq!(e.text(), "ab");

        assert!(e.undo());
        assert_eq!(e.text(), "a");
        assert_eq!(e.selection(), Selection::cursor(1));

        assert!(e.redo());
        assert_eq!(e.text(), "ab");
        assert_eq!(e.selection(), Selection::cursor(2));
        assert!(!e.can_redo());
    }

    #[test]
    fn test_doc_filter_rejects_transaction() {
        fn digits(doc: &str) -> bool {
            doc.chars().all(|c| c.is_ascii_digit())
        }
        let mut e = CodeEngine::new("12", EditConstraints::numeric(digits));
        assert!(e.insert_text("a").is_none());
        assert_eq!(e.text(), "12");
        assert!(e.insert_text("3").is_some());
        assert_eq!(e.text(), "123");
    }

    #[test]
    fn test_external_transaction_skips_history() {
        let mut e = engine("abc");
        let event = e
            .dispatch(Transaction::new(vec![Change::replace(0, 3, "xyz")]).external())
            .unwrap();
        assert!(event.external);
        assert_eq!(e.text(), "xyz");
        assert!(!e.can_undo());
    }

    #[test]
    fn test_tokens_map_through_edits() {
        let mut e = engine("ab ${x}");
        e.dispatch(Transaction::default().with_effect(StateEffect::SetTokens(vec![Token::new(
            crate::tokens::TokenKind::Variable,
            5,
            1,
        )])));
        e.set_selection(Selection::cursor(0));
        e.insert_text("zz");
        assert_eq!(e.tokens()[0].start, 7);

        // Editing inside the token drops it
        e.set_selection(Selection::new(7, 8));
        e.insert_text("y");
        assert!(e.tokens().is_empty());
    }

    #[test]
    fn test_line_info_and_position() {
        let e = engine("one\ntwo\nthree");
        let line = e.line_at(5);
        assert_eq!(line.number, 1);
        assert_eq!((line.from, line.to), (4, 7));
        assert_eq!(line.text, "two");
        assert_eq!(e.position(9), Position::new(2, 1));
    }

    #[test]
    fn test_word_before_cursor() {
        let mut e = engine("foo + bar");
        e.set_selection(Selection::cursor(9));
        assert_eq!(e.word_before_cursor(), "bar");
        e.set_selection(Selection::cursor(6));
        assert_eq!(e.word_before_cursor(), "");
    }
}
