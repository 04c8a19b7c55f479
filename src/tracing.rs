//! Logging setup and selection-state snapshots for diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=chip_editor::tokens=trace` - token sync decisions only
//! - `RUST_LOG=chip_editor::chip=debug` - helper pane and insertion flow
//!
//! # Log Files
//!
//! Logs are written to `~/.config/chip-editor/logs/chip-editor.log` with daily
//! rotation, always at debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::editable::CodeEngine;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`).
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG. stderr keeps stdout clean for CLI output.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            None
        }
    };

    // A host may have installed its own subscriber already
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of engine selection state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub anchor: (usize, usize),
    pub head: (usize, usize),
    pub revision: u64,
}

impl SelectionSnapshot {
    pub fn from_engine(engine: &CodeEngine) -> Self {
        let sel = engine.selection();
        let anchor = engine.position(sel.anchor);
        let head = engine.position(sel.head);
        Self {
            anchor: (anchor.line, anchor.column),
            head: (head.line, head.column),
            revision: engine.revision(),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &SelectionSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.head != other.head {
            changes.push(format!(
                "head ({},{}) → ({},{})",
                self.head.0, self.head.1, other.head.0, other.head.1
            ));
        }
        if self.anchor != other.anchor {
            changes.push(format!(
                "anchor ({},{}) → ({},{})",
                self.anchor.0, self.anchor.1, other.anchor.0, other.anchor.1
            ));
        }
        if self.revision != other.revision {
            changes.push(format!("rev {} → {}", self.revision, other.revision));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::{EditConstraints, Selection};

    #[test]
    fn test_snapshot_diff() {
        let mut engine = CodeEngine::new("ab\ncd", EditConstraints::multiline());
        let before = SelectionSnapshot::from_engine(&engine);
        assert_eq!(before.head, (1, 2));

        engine.set_selection(Selection::cursor(1));
        let after = SelectionSnapshot::from_engine(&engine);
        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("head (1,2) → (0,1)"));
        assert!(before.diff(&before).is_none());
    }
}
