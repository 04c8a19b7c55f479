//! Single-slot holder for the selection saved when the helper pane opens.
//!
//! Clicking the toggle button or an item in the pane moves focus out of the
//! editor, so the live selection is unreliable by the time an item is picked.
//! The selection is stored on open and taken once on insertion; `take`
//! empties the slot, so a second consumer sees `None`.

use crate::editable::Selection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionMailbox {
    slot: Option<Selection>,
}

impl SelectionMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write, replacing any unconsumed selection
    pub fn store(&mut self, selection: Selection) {
        self.slot = Some(selection);
    }

    /// Read and clear
    pub fn take(&mut self) -> Option<Selection> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<Selection> {
        self.slot
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears_slot() {
        let mut mailbox = SelectionMailbox::new();
        mailbox.store(Selection::new(2, 5));
        assert_eq!(mailbox.take(), Some(Selection::new(2, 5)));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_store_overwrites() {
        let mut mailbox = SelectionMailbox::new();
        mailbox.store(Selection::cursor(1));
        mailbox.store(Selection::cursor(4));
        assert_eq!(mailbox.peek(), Some(Selection::cursor(4)));
    }
}
