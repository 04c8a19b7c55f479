//! Commands a keystroke can trigger inside the editors

use std::fmt;
use std::str::FromStr;

use crate::template::{BlockType, InlineMark, ListKind};

/// Everything a key binding can ask an editor to do.
///
/// Prompt modes route formatting commands through
/// [`crate::template::StructuredEditing`]; the rest are handled by the
/// chip editor or the mode shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleBold,
    ToggleItalic,
    /// Opens the link dialog
    InsertLink,
    /// Level 1-6
    ToggleHeading(u8),
    ToggleBlockquote,
    ToggleBulletList,
    ToggleOrderedList,
    ToggleTaskList,
    /// Enter inside a list item
    ContinueList,

    Undo,
    Redo,

    /// Opens or closes the helper pane
    ToggleHelper,
    /// Escape: closes the topmost overlay
    Dismiss,
    /// Switches a prompt between raw and rich views
    ToggleRawView,
    /// Switches a prompt or template between edit and preview
    TogglePreview,
    /// Opens the expanded editor
    Expand,

    /// Removes a default binding from a user keymap
    Unbound,
}

impl Command {
    /// Formatting intent, if this command is one
    pub fn as_formatting(self) -> Option<Formatting> {
        let action = match self {
            Command::ToggleBold => Formatting::Inline(InlineMark::Bold),
            Command::ToggleItalic => Formatting::Inline(InlineMark::Italic),
            Command::InsertLink => Formatting::Inline(InlineMark::Link),
            Command::ToggleHeading(level) => Formatting::Block(BlockType::Heading(level)),
            Command::ToggleBlockquote => Formatting::Block(BlockType::Blockquote),
            Command::ToggleBulletList => Formatting::List(ListKind::Unordered),
            Command::ToggleOrderedList => Formatting::List(ListKind::Ordered),
            Command::ToggleTaskList => Formatting::List(ListKind::Task),
            _ => return None,
        };
        Some(action)
    }

    /// Whether this command changes the document
    pub fn is_edit(self) -> bool {
        self.as_formatting().is_some()
            || matches!(self, Command::ContinueList | Command::Undo | Command::Redo)
    }
}

/// Formatting a command applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formatting {
    Inline(InlineMark),
    Block(BlockType),
    List(ListKind),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ToggleHeading(level) => write!(f, "ToggleHeading{}", level),
            other => write!(f, "{:?}", other),
        }
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(level) = s.strip_prefix("ToggleHeading") {
            return match level.parse::<u8>() {
                Ok(level @ 1..=6) => Ok(Command::ToggleHeading(level)),
                _ => Err(()),
            };
        }
        match s {
            "ToggleBold" => Ok(Command::ToggleBold),
            "ToggleItalic" => Ok(Command::ToggleItalic),
            "InsertLink" => Ok(Command::InsertLink),
            "ToggleBlockquote" => Ok(Command::ToggleBlockquote),
            "ToggleBulletList" => Ok(Command::ToggleBulletList),
            "ToggleOrderedList" => Ok(Command::ToggleOrderedList),
            "ToggleTaskList" => Ok(Command::ToggleTaskList),
            "ContinueList" => Ok(Command::ContinueList),
            "Undo" => Ok(Command::Undo),
            "Redo" => Ok(Command::Redo),
            "ToggleHelper" => Ok(Command::ToggleHelper),
            "Dismiss" => Ok(Command::Dismiss),
            "ToggleRawView" => Ok(Command::ToggleRawView),
            "TogglePreview" => Ok(Command::TogglePreview),
            "Expand" => Ok(Command::Expand),
            "Unbound" => Ok(Command::Unbound),
            _ => Err(()),
        }
    }
}
