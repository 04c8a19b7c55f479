//! Chip editor core: one live [`crate::editable::CodeEngine`] per mounted
//! editor, bridged to the host through values and [`crate::commands::Cmd`]s.

mod completion;
mod editor;
mod helper;
mod mailbox;

pub use completion::{filter_completions, CompletionItem, CompletionKind};
pub use editor::{with_placeholders, ChipEditor, Transform};
pub use helper::{anchor_below, should_open_after_change, DismissTargets, HelperOptions, HelperPaneState, PaneHeight};
pub use mailbox::SelectionMailbox;
