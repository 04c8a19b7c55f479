//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/chip-editor/config.yaml`

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::chip::PaneHeight;

/// Helper pane geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperPaneConfig {
    /// Fixed pane width used for right-edge clamping
    pub width: f32,
    pub height: PaneHeight,
    /// Minimum gap to the viewport edge
    pub margin: f32,
}

impl Default for HelperPaneConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: PaneHeight::Default,
            margin: 8.0,
        }
    }
}

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Quiet period after an edit before tokens are refetched
    #[serde(default = "default_token_debounce_ms")]
    pub token_debounce_ms: u64,

    #[serde(default)]
    pub helper_pane: HelperPaneConfig,

    /// Field keys that open in prompt mode by default
    #[serde(default = "default_prompt_field_keys")]
    pub prompt_field_keys: Vec<String>,

    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,

    /// Characters that open the helper pane when typed before the cursor
    #[serde(default = "default_trigger_characters")]
    pub trigger_characters: Vec<char>,
}

fn default_token_debounce_ms() -> u64 {
    250
}

fn default_prompt_field_keys() -> Vec<String> {
    ["query", "instructions", "role"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_undo_depth() -> usize {
    200
}

fn default_trigger_characters() -> Vec<char> {
    vec!['+', ':']
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            token_debounce_ms: default_token_debounce_ms(),
            helper_pane: HelperPaneConfig::default(),
            prompt_field_keys: default_prompt_field_keys(),
            undo_depth: default_undo_depth(),
            trigger_characters: default_trigger_characters(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load from a specific file; missing or invalid files yield defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        let path = crate::config_paths::config_file().context("no config directory available")?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("failed to create config directory")?;
        }

        let content = serde_yaml::to_string(self).context("failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Whether a field key defaults to prompt mode
    pub fn is_prompt_key(&self, key: &str) -> bool {
        self.prompt_field_keys.iter().any(|k| k == key)
    }
}
