//! Structured rich-text engine.
//!
//! The document is a node tree ([`Document`]); edits run against its flat
//! textblock view and the tree is rebuilt on demand. Undo keeps whole
//! snapshots of the flat view.

mod commands;
pub mod document;
mod editor;

pub use commands::RichCommands;
pub use document::{Block, Document, Element, Marks, Node, NodeKind, Path, TextBlockKind, TextLeaf, Wrapper};
pub use editor::{Caret, Point, RichEditor, RichSelection, UndoRecord, DEFAULT_MAX_UNDO};
