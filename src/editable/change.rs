//! Transactions: the only way document, selection and token state change.

use ropey::Rope;

use super::selection::Selection;
use crate::tokens::Token;

/// Replace `from..to` (char offsets in the pre-transaction document) with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl Change {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            from: at,
            to: at,
            insert: text.into(),
        }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            insert: String::new(),
        }
    }

    pub fn replace(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: text.into(),
        }
    }

    fn inserted_len(&self) -> usize {
        self.insert.chars().count()
    }
}

/// Non-state-text payloads carried by a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum StateEffect {
    /// Replace the token overlay
    SetTokens(Vec<Token>),
}

/// Metadata the change listener reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    /// Content came from the host, not the user; listeners must not echo it upward
    pub external: bool,
    /// Record in undo history
    pub add_to_history: bool,
    /// Free-form origin tag for logs ("input", "format.bold", ...)
    pub user_event: Option<&'static str>,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            external: false,
            add_to_history: true,
            user_event: None,
        }
    }
}

/// A batch of changes applied atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    /// Changes in pre-transaction coordinates, non-overlapping
    pub changes: Vec<Change>,
    /// Selection after the transaction (post-transaction coordinates).
    /// `None` maps the current selection through the changes.
    pub selection: Option<Selection>,
    pub effects: Vec<StateEffect>,
    pub annotations: Annotations,
}

impl Transaction {
    pub fn new(changes: Vec<Change>) -> Self {
        Self {
            changes,
            ..Self::default()
        }
    }

    pub fn select(selection: Selection) -> Self {
        Self {
            selection: Some(selection),
            ..Self::default()
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_effect(mut self, effect: StateEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn user_event(mut self, event: &'static str) -> Self {
        self.annotations.user_event = Some(event);
        self
    }

    /// Mark as externally sourced: skipped by history and by upward change emission
    pub fn external(mut self) -> Self {
        self.annotations.external = true;
        self.annotations.add_to_history = false;
        self
    }

    pub fn doc_changed(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.from != c.to || !c.insert.is_empty())
    }

    /// Changes sorted by position, as `apply` expects
    pub(crate) fn sorted_changes(&self) -> Vec<Change> {
        let mut changes = self.changes.clone();
        changes.sort_by_key(|c| (c.from, c.to));
        changes
    }
}

/// Apply sorted, non-overlapping changes to a rope.
/// Returns the inverse changes (in post-transaction coordinates).
pub(crate) fn apply_changes(doc: &mut Rope, changes: &[Change]) -> Vec<Change> {
    let len = doc.len_chars();
    let mut inverse = Vec::with_capacity(changes.len());
    let mut delta: isize = 0;
    for change in changes {
        let from = change.from.min(len);
        let to = change.to.clamp(from, len);
        let deleted = doc.slice(from..to).to_string();
        let new_from = (from as isize + delta) as usize;
        inverse.push(Change {
            from: new_from,
            to: new_from + change.inserted_len(),
            insert: deleted,
        });
        delta += change.inserted_len() as isize - (to - from) as isize;
    }
    // Back to front so earlier offsets stay valid
    for change in changes.iter().rev() {
        let from = change.from.min(len);
        let to = change.to.clamp(from, len);
        if from < to {
            doc.remove(from..to);
        }
        if !change.insert.is_empty() {
            doc.insert(from, &change.insert);
        }
    }
    inverse
}

/// Map a position through sorted changes. `assoc < 0` sticks to the left of an
/// insertion at the same point, otherwise to the right.
pub fn map_pos(pos: usize, changes: &[Change], assoc: i8) -> usize {
    let mut delta: isize = 0;
    for change in changes {
        if change.from > pos || (change.from == pos && change.from == change.to && assoc < 0) {
            break;
        }
        let inserted = change.inserted_len() as isize;
        if pos < change.to {
            // Inside a replaced span: snap to the matching edge of the insertion
            let edge = if assoc < 0 { 0 } else { inserted };
            return (change.from as isize + delta + edge) as usize;
        }
        delta += inserted - (change.to - change.from) as isize;
    }
    (pos as isize + delta).max(0) as usize
}

/// Map a range through changes; `None` if any change touches its interior.
pub fn map_range(from: usize, to: usize, changes: &[Change]) -> Option<(usize, usize)> {
    let touched = changes.iter().any(|c| {
        let c_to = c.to.max(c.from);
        (c.from < to && c_to > from) || (c.from > from && c.from < to)
    });
    if touched {
        return None;
    }
    Some((map_pos(from, changes, 1), map_pos(to, changes, -1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_changes_and_inverse() {
        let mut doc = Rope::from_str("hello world");
        let changes = vec![Change::insert(0, "**"), Change::insert(5, "**")];
        let inverse = apply_changes(&mut doc, &changes);
        assert_eq!(doc.to_string(), "**hello** world");

        apply_changes(&mut doc, &inverse);
        assert_eq!(doc.to_string(), "hello world");
    }

    #[test]
    fn test_map_pos_through_insert() {
        let changes = vec![Change::insert(2, "abc")];
        assert_eq!(map_pos(1, &changes, 1), 1);
        assert_eq!(map_pos(2, &changes, -1), 2);
        assert_eq!(map_pos(2, &changes, 1), 5);
        assert_eq!(map_pos(4, &changes, 1), 7);
    }

    #[test]
    fn test_map_range_drops_touched() {
        let changes = vec![Change::replace(3, 5, "x")];
        assert_eq!(map_range(6, 9, &changes), Some((5, 8)));
        assert_eq!(map_range(0, 2, &changes), Some((0, 2)));
        assert_eq!(map_range(2, 4, &changes), None);
    }
}
