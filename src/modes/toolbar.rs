//! Markdown toolbar: button state and actions over any editing engine.
//!
//! The toolbar never looks an editor up; the caller passes the
//! [`StructuredEditing`] object for whichever view is showing.

use crate::keymap::{Command, Keymap};
use crate::template::{ActiveQuery, BlockType, InlineMark, ListKind, StructuredEditing};

pub const HEADING_LEVELS: std::ops::RangeInclusive<u8> = 1..=6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    Bold,
    Italic,
    Link,
    /// Main half of the heading split button: repeats the last level
    Heading,
    /// A level picked from the dropdown
    HeadingLevel(u8),
    Blockquote,
    BulletList,
    OrderedList,
    TaskList,
    Undo,
    Redo,
    /// Rich/raw or edit/preview switch, depending on the mode
    SwitchView,
}

impl ToolbarAction {
    /// Button order, left to right
    pub const BUTTONS: [ToolbarAction; 11] = [
        ToolbarAction::Bold,
        ToolbarAction::Italic,
        ToolbarAction::Link,
        ToolbarAction::Heading,
        ToolbarAction::Blockquote,
        ToolbarAction::BulletList,
        ToolbarAction::OrderedList,
        ToolbarAction::TaskList,
        ToolbarAction::Undo,
        ToolbarAction::Redo,
        ToolbarAction::SwitchView,
    ];

    fn command(self, heading_level: u8) -> Command {
        match self {
            ToolbarAction::Bold => Command::ToggleBold,
            ToolbarAction::Italic => Command::ToggleItalic,
            ToolbarAction::Link => Command::InsertLink,
            ToolbarAction::Heading => Command::ToggleHeading(heading_level),
            ToolbarAction::HeadingLevel(level) => Command::ToggleHeading(level),
            ToolbarAction::Blockquote => Command::ToggleBlockquote,
            ToolbarAction::BulletList => Command::ToggleBulletList,
            ToolbarAction::OrderedList => Command::ToggleOrderedList,
            ToolbarAction::TaskList => Command::ToggleTaskList,
            ToolbarAction::Undo => Command::Undo,
            ToolbarAction::Redo => Command::Redo,
            ToolbarAction::SwitchView => Command::ToggleRawView,
        }
    }

    fn query(self, heading_level: u8) -> Option<ActiveQuery> {
        let query = match self {
            ToolbarAction::Bold => ActiveQuery::Mark(InlineMark::Bold),
            ToolbarAction::Italic => ActiveQuery::Mark(InlineMark::Italic),
            ToolbarAction::Link => ActiveQuery::Mark(InlineMark::Link),
            ToolbarAction::Heading => ActiveQuery::Block(BlockType::Heading(heading_level)),
            ToolbarAction::HeadingLevel(level) => ActiveQuery::Block(BlockType::Heading(level)),
            ToolbarAction::Blockquote => ActiveQuery::Block(BlockType::Blockquote),
            ToolbarAction::BulletList => ActiveQuery::List(ListKind::Unordered),
            ToolbarAction::OrderedList => ActiveQuery::List(ListKind::Ordered),
            ToolbarAction::TaskList => ActiveQuery::List(ListKind::Task),
            ToolbarAction::Undo | ToolbarAction::Redo | ToolbarAction::SwitchView => return None,
        };
        Some(query)
    }
}

/// Rendering state of one button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub action: ToolbarAction,
    pub active: bool,
    pub enabled: bool,
    /// Shortcut label, when the keymap binds one
    pub shortcut: Option<String>,
}

/// Result of pressing a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarOutcome {
    /// The engine ran the command; `true` if the document changed
    Applied(bool),
    /// A link needs a target: open the link dialog
    NeedsLinkTarget,
    /// The mode should switch views
    SwitchView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownToolbar {
    heading_level: u8,
    dropdown_open: bool,
}

impl Default for MarkdownToolbar {
    fn default() -> Self {
        Self {
            heading_level: 1,
            dropdown_open: false,
        }
    }
}

impl MarkdownToolbar {
    pub fn heading_level(&self) -> u8 {
        self.heading_level
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    /// Button states mirroring the engine under the selection
    pub fn buttons(&self, target: &dyn StructuredEditing, keymap: Option<&Keymap>) -> Vec<ButtonState> {
        ToolbarAction::BUTTONS
            .iter()
            .map(|&action| self.button(action, target, keymap))
            .collect()
    }

    /// Entries of the heading dropdown
    pub fn heading_options(&self, target: &dyn StructuredEditing, keymap: Option<&Keymap>) -> Vec<ButtonState> {
        HEADING_LEVELS
            .map(|level| self.button(ToolbarAction::HeadingLevel(level), target, keymap))
            .collect()
    }

    fn button(&self, action: ToolbarAction, target: &dyn StructuredEditing, keymap: Option<&Keymap>) -> ButtonState {
        let active = action
            .query(self.heading_level)
            .is_some_and(|q| target.is_active(q));
        let enabled = match action {
            ToolbarAction::Undo => target.can_undo(),
            ToolbarAction::Redo => target.can_redo(),
            _ => true,
        };
        ButtonState {
            action,
            active,
            enabled,
            shortcut: keymap.and_then(|k| k.display_for(action.command(self.heading_level))),
        }
    }

    /// Run a button against the engine
    pub fn apply(&mut self, action: ToolbarAction, target: &mut dyn StructuredEditing) -> ToolbarOutcome {
        self.dropdown_open = false;
        let changed = match action {
            ToolbarAction::Bold => target.toggle_inline(InlineMark::Bold),
            ToolbarAction::Italic => target.toggle_inline(InlineMark::Italic),
            ToolbarAction::Link => {
                // Removing needs no target; adding may
                if target.toggle_link(None) {
                    true
                } else {
                    return ToolbarOutcome::NeedsLinkTarget;
                }
            }
            ToolbarAction::Heading => target.toggle_block(BlockType::Heading(self.heading_level)),
            ToolbarAction::HeadingLevel(level) => {
                let level = level.clamp(*HEADING_LEVELS.start(), *HEADING_LEVELS.end());
                self.heading_level = level;
                target.toggle_block(BlockType::Heading(level))
            }
            ToolbarAction::Blockquote => target.toggle_block(BlockType::Blockquote),
            ToolbarAction::BulletList => target.toggle_list(ListKind::Unordered),
            ToolbarAction::OrderedList => target.toggle_list(ListKind::Ordered),
            ToolbarAction::TaskList => target.toggle_list(ListKind::Task),
            ToolbarAction::Undo => target.undo(),
            ToolbarAction::Redo => target.redo(),
            ToolbarAction::SwitchView => return ToolbarOutcome::SwitchView,
        };
        ToolbarOutcome::Applied(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RichCommands;

    #[test]
    fn test_detached_buttons_are_inactive() {
        let toolbar = MarkdownToolbar::default();
        let target = RichCommands::new(None);
        let buttons = toolbar.buttons(&target, None);
        assert_eq!(buttons.len(), ToolbarAction::BUTTONS.len());
        assert!(buttons.iter().all(|b| !b.active));
        let undo = buttons.iter().find(|b| b.action == ToolbarAction::Undo).unwrap();
        assert!(!undo.enabled);
    }

    #[test]
    fn test_heading_dropdown_remembers_level() {
        let mut toolbar = MarkdownToolbar::default();
        let mut target = RichCommands::new(None);
        toolbar.toggle_dropdown();
        assert!(toolbar.is_dropdown_open());
        toolbar.apply(ToolbarAction::HeadingLevel(9), &mut target);
        assert_eq!(toolbar.heading_level(), 6);
        assert!(!toolbar.is_dropdown_open());
        assert_eq!(toolbar.heading_options(&target, None).len(), 6);
    }

    #[test]
    fn test_link_without_target_asks_for_one() {
        let mut toolbar = MarkdownToolbar::default();
        let mut target = RichCommands::new(None);
        assert_eq!(
            toolbar.apply(ToolbarAction::Link, &mut target),
            ToolbarOutcome::NeedsLinkTarget
        );
        assert_eq!(
            toolbar.apply(ToolbarAction::SwitchView, &mut target),
            ToolbarOutcome::SwitchView
        );
    }
}
