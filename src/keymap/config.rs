//! YAML keymap parsing

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use super::binding::Keybinding;
use super::command::Command;
use super::context::Condition;
use super::types::{KeyCode, Keystroke, Modifiers};

/// Root of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    pub bindings: Vec<BindingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub command: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub when: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("failed to read keymap: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse keymap: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("invalid condition: {0}")]
    InvalidCondition(String),
}

pub fn load_keymap_file(path: &Path) -> Result<Vec<Keybinding>, KeymapError> {
    let content = std::fs::read_to_string(path)?;
    parse_keymap_yaml(&content)
}

/// Parses bindings, skipping entries for other platforms
pub fn parse_keymap_yaml(yaml: &str) -> Result<Vec<Keybinding>, KeymapError> {
    let config: KeymapConfig = serde_yaml::from_str(yaml)?;
    let platform = current_platform();

    let mut bindings = Vec::with_capacity(config.bindings.len());
    for entry in config.bindings {
        if entry.platform.as_deref().is_some_and(|p| p != platform) {
            continue;
        }

        let keystroke = parse_key_string(&entry.key)?;
        let command = Command::from_str(&entry.command)
            .map_err(|_| KeymapError::InvalidCommand(entry.command.clone()))?;

        let mut binding = Keybinding::new(keystroke, command);
        if let Some(when) = &entry.when {
            let conditions = when
                .iter()
                .map(|c| parse_condition(c))
                .collect::<Result<Vec<_>, _>>()?;
            binding = binding.when(conditions);
        }
        bindings.push(binding);
    }

    Ok(bindings)
}

/// Parses `"cmd+shift+z"` style strings
pub fn parse_key_string(key_str: &str) -> Result<Keystroke, KeymapError> {
    let invalid = || KeymapError::InvalidKey(key_str.to_string());

    // "cmd++" binds the plus key
    let (mods_part, key_part) = match key_str.strip_suffix("++") {
        Some(rest) => (rest, "+"),
        None => match key_str.rsplit_once('+') {
            Some((mods, key)) => (mods, key),
            None => ("", key_str),
        },
    };
    if key_part.is_empty() {
        return Err(invalid());
    }

    let mut mods = Modifiers::NONE;
    for part in mods_part.split('+').filter(|p| !p.is_empty()) {
        mods = mods
            | match part.to_lowercase().as_str() {
                "cmd" | "mod" => Modifiers::cmd(),
                "ctrl" | "control" => Modifiers::CTRL,
                "shift" => Modifiers::SHIFT,
                "alt" | "option" | "opt" => Modifiers::ALT,
                "meta" | "super" | "win" => Modifiers::META,
                _ => return Err(invalid()),
            };
    }

    let key = match key_part.to_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Escape,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "space" => KeyCode::Space,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(invalid()),
            }
        }
    };

    Ok(Keystroke::new(key, mods))
}

fn parse_condition(cond: &str) -> Result<Condition, KeymapError> {
    match cond.to_lowercase().as_str() {
        "has_selection" | "selection" => Ok(Condition::HasSelection),
        "no_selection" => Ok(Condition::NoSelection),
        "in_list_item" | "list_item" => Ok(Condition::InListItem),
        "helper_open" => Ok(Condition::HelperOpen),
        "dialog_open" | "modal_active" => Ok(Condition::DialogOpen),
        "dialog_closed" | "modal_inactive" => Ok(Condition::DialogClosed),
        "rich_view" | "rich" => Ok(Condition::RichView),
        "raw_view" | "raw" => Ok(Condition::RawView),
        _ => Err(KeymapError::InvalidCondition(cond.to_string())),
    }
}

fn current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_string() {
        let stroke = parse_key_string("cmd+shift+z").unwrap();
        assert_eq!(stroke.key, KeyCode::Char('z'));
        assert_eq!(stroke.mods, Modifiers::cmd() | Modifiers::SHIFT);

        assert_eq!(
            parse_key_string("escape").unwrap(),
            Keystroke::key(KeyCode::Escape)
        );
        assert_eq!(
            parse_key_string("ctrl++").unwrap(),
            Keystroke::new(KeyCode::Char('+'), Modifiers::CTRL)
        );
    }

    #[test]
    fn test_parse_key_string_rejects_garbage() {
        assert!(matches!(
            parse_key_string("hyper+b"),
            Err(KeymapError::InvalidKey(_))
        ));
        assert!(parse_key_string("cmd+pageup").is_err());
    }

    #[test]
    fn test_parse_yaml_with_conditions() {
        let yaml = r#"
bindings:
  - key: enter
    command: ContinueList
    when: [in_list_item]
  - key: cmd+b
    command: ToggleBold
"#;
        let bindings = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].when, Some(vec![Condition::InListItem]));
        assert_eq!(bindings[1].command, Command::ToggleBold);
    }

    #[test]
    fn test_platform_filter() {
        let yaml = r#"
bindings:
  - key: cmd+y
    command: Redo
    platform: nowhere
"#;
        assert!(parse_keymap_yaml(yaml).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_command() {
        let yaml = "bindings:\n  - key: cmd+q\n    command: Quit\n";
        assert!(matches!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::InvalidCommand(c)) if c == "Quit"
        ));
    }
}
