//! Configurable key bindings
//!
//! ```text
//! host key event → Keystroke → Keymap::lookup(ctx) → Command → mode
//! ```
//!
//! Defaults are embedded from `keymap.yaml`; a user file in the config
//! directory is merged over them.

mod binding;
mod command;
mod config;
mod context;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod types;

pub use binding::Keybinding;
pub use command::{Command, Formatting};
pub use config::{load_keymap_file, parse_key_string, parse_keymap_yaml, KeymapError};
pub use context::{Condition, KeyContext};
pub use defaults::{default_bindings, default_keymap_yaml, load_default_keymap, merge_bindings};
pub use keymap::Keymap;
pub use types::{KeyCode, Keystroke, Modifiers};
