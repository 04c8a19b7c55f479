//! Chip Editor - Elm-style expression and template editing core
//!
//! This crate provides the editing logic behind form fields that mix plain
//! text with `${...}` expressions rendered as inline chips: value codecs,
//! token sync with an external tokenizer, helper pane state, rich markdown
//! editing and keybindings. Rendering belongs to the host.

pub mod chip;
pub mod codec;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod editable;
pub mod field;
pub mod keymap;
pub mod messages;
pub mod modes;
pub mod overlay;
pub mod rpc;
pub mod runtime;
pub mod template;
pub mod tokens;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use chip::ChipEditor;
pub use codec::ModeConfig;
pub use commands::{Cmd, EditorId};
pub use config::EditorConfig;
pub use field::{FieldType, FormField};
pub use messages::Msg;
pub use modes::{EditorMode, ModeProps, ModeView};
pub use runtime::{Runtime, ValueChange};
