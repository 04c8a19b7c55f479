//! Selection types for the editing engine.

use std::ops::Range;

/// A text selection in char offsets with anchor (fixed point) and head (cursor).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Where the selection started (fixed point)
    pub anchor: usize,
    /// Where the cursor is (moving point)
    pub head: usize,
}

impl Selection {
    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor with no selection)
    pub const fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Check if selection is empty (anchor == head)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Smaller of anchor and head (`from` in the host contract)
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Larger of anchor and head (`to` in the host contract)
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn range(&self) -> Range<usize> {
        self.from()..self.to()
    }

    /// Check if selection is reversed (head before anchor)
    pub fn is_reversed(&self) -> bool {
        self.head < self.anchor
    }

    /// Clamp both ends to a document of `len` chars
    pub fn clamp(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_to() {
        let forward = Selection::new(2, 7);
        assert_eq!(forward.from(), 2);
        assert_eq!(forward.to(), 7);
        assert!(!forward.is_reversed());

        let backward = Selection::new(7, 2);
        assert_eq!(backward.range(), 2..7);
        assert!(backward.is_reversed());
    }

    #[test]
    fn test_selection_clamp() {
        let sel = Selection::new(3, 40).clamp(10);
        assert_eq!(sel, Selection::new(3, 10));
        assert!(Selection::cursor(4).is_empty());
    }
}
