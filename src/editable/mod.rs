//! Plain-text editing engine shared by every mode.
//!
//! Expression, template and raw-markdown editing all run on [`CodeEngine`]:
//!
//! - [`Transaction`]: a batch of [`Change`]s plus selection, effects and annotations
//! - [`EditConstraints`]: per-mode restrictions (single line, numeric filter, undo depth)
//! - [`EditHistory`]: undo/redo of inverse changes
//! - [`Selection`]: anchor/head in char offsets
//!
//! # Example
//!
//! ```ignore
//! use chip_editor::editable::{CodeEngine, EditConstraints, Selection};
//!
//! let mut engine = CodeEngine::new("hello", EditConstraints::single_line());
//! engine.set_selection(Selection::cursor(5));
//! engine.insert_text("!");
//!
//! assert_eq!(engine.text(), "hello!");
//! ```

mod change;
mod constraints;
mod cursor;
mod history;
mod selection;
mod state;

pub use change::{map_pos, map_range, Annotations, Change, StateEffect, Transaction};
pub use constraints::{CharFilter, DocFilter, EditConstraints};
pub use cursor::Position;
pub use history::{EditHistory, HistoryEntry};
pub use selection::Selection;
pub use state::{ChangeEvent, CodeEngine, LineInfo};
