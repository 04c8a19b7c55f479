//! Default bindings and user keymap merging

use super::binding::Keybinding;
use super::command::Command;
use super::config::{load_keymap_file, parse_keymap_yaml};

const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

pub fn default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Embedded defaults; falls back to an empty set if the embedded file is broken
pub fn default_bindings() -> Vec<Keybinding> {
    match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(bindings) => bindings,
        Err(e) => {
            tracing::error!("Embedded keymap is invalid: {}", e);
            Vec::new()
        }
    }
}

/// Defaults merged with the user's keymap file, when present
pub fn load_default_keymap() -> Vec<Keybinding> {
    let mut bindings = default_bindings();

    if let Some(user_path) = crate::config_paths::keymap_file() {
        if user_path.exists() {
            match load_keymap_file(&user_path) {
                Ok(user_bindings) => {
                    tracing::info!(
                        "Merging user keymap from {} ({} bindings)",
                        user_path.display(),
                        user_bindings.len()
                    );
                    bindings = merge_bindings(bindings, user_bindings);
                }
                Err(e) => {
                    tracing::warn!("Failed to load user keymap from {}: {}", user_path.display(), e);
                }
            }
        }
    }

    bindings
}

/// Applies user bindings over a base set.
///
/// Same keystroke and conditions replaces; `Unbound` removes every base
/// binding on that keystroke; anything else is appended.
pub fn merge_bindings(base: Vec<Keybinding>, user: Vec<Keybinding>) -> Vec<Keybinding> {
    let mut result = base;

    for user_binding in user {
        if user_binding.command == Command::Unbound {
            result.retain(|b| b.keystroke != user_binding.keystroke);
            continue;
        }

        let existing = result
            .iter()
            .position(|b| b.keystroke == user_binding.keystroke && b.when == user_binding.when);
        match existing {
            Some(idx) => result[idx] = user_binding,
            None => result.push(user_binding),
        }
    }

    result
}
