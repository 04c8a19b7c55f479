//! Edit history (undo/redo) for the editing engine.

use super::change::Change;
use super::selection::Selection;

/// One undoable transaction.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Changes as applied (pre-transaction coordinates)
    pub changes: Vec<Change>,
    /// Changes that revert them (post-transaction coordinates)
    pub inverse: Vec<Change>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

impl HistoryEntry {
    /// The entry that undoes this one
    pub fn inverted(&self) -> Self {
        Self {
            changes: self.inverse.clone(),
            inverse: self.changes.clone(),
            selection_before: self.selection_after,
            selection_after: self.selection_before,
        }
    }
}

/// Linear history with undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_size: usize,
}

impl EditHistory {
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Push an entry onto the undo stack (clears redo stack)
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);

        if self.undo_stack.len() > self.max_size {
            let excess = self.undo_stack.len() - self.max_size;
            self.undo_stack.drain(..excess);
        }
    }

    /// Pop the entry to revert; its inversion moves to the redo stack.
    /// The returned entry's `inverse` is what the caller applies.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry.inverted());
        Some(entry)
    }

    /// Pop the entry to re-apply; its inversion moves back to the undo stack.
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry.inverted());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(at: usize, text: &str) -> HistoryEntry {
        let len = text.chars().count();
        HistoryEntry {
            changes: vec![Change::insert(at, text)],
            inverse: vec![Change::delete(at, at + len)],
            selection_before: Selection::cursor(at),
            selection_after: Selection::cursor(at + len),
        }
    }

    #[test]
    fn test_undo_moves_inversion_to_redo() {
        let mut history = EditHistory::with_max_size(10);
        history.push(entry(0, "a"));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let undone = history.pop_undo().unwrap();
        assert_eq!(undone.inverse, vec![Change::delete(0, 1)]);
        assert!(history.can_redo());

        // The redo entry's inverse re-inserts the text
        let redone = history.pop_redo().unwrap();
        assert_eq!(redone.inverse, vec![Change::insert(0, "a")]);
        assert!(history.can_undo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = EditHistory::with_max_size(10);
        history.push(entry(0, "a"));
        history.pop_undo();
        history.push(entry(0, "b"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_size() {
        let mut history = EditHistory::with_max_size(3);
        for i in 0..5 {
            history.push(entry(i, "x"));
        }
        assert_eq!(history.undo_count(), 3);
    }
}
