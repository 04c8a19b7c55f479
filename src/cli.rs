//! Command-line interface for inspecting editor behaviour outside a host
//!
//! Supports:
//! - Converting values between the stored and displayed forms
//! - Applying a markdown command to text
//! - Rendering a preview
//! - Listing the effective keybindings

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use chip_editor::codec::PrimaryMode;

#[derive(Parser, Debug)]
#[command(name = "chip-editor", version, about = "Chip editor tooling")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Convert a value with a mode's codec
    Codec {
        #[arg(long, value_enum, default_value_t = CliMode::Expression)]
        mode: CliMode,
        /// Convert displayed text back to the stored value
        #[arg(short, long)]
        deserialize: bool,
        value: String,
    },
    /// Apply a markdown command to text over a selection
    Format {
        #[arg(long, value_enum)]
        command: FormatCommand,
        /// Heading level for `--command heading`
        #[arg(long, default_value_t = 1)]
        level: u8,
        /// Selection anchor (char offset); defaults to the start
        #[arg(long)]
        from: Option<usize>,
        /// Selection head (char offset); defaults to `from`
        #[arg(long)]
        to: Option<usize>,
        /// Markdown file; stdin when omitted
        path: Option<PathBuf>,
    },
    /// Render markdown to preview HTML
    Preview {
        /// Markdown file; stdin when omitted
        path: Option<PathBuf>,
    },
    /// Print the effective keybindings
    Keymap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    Expression,
    Text,
    Template,
    RawTemplate,
    Sql,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatCommand {
    Bold,
    Italic,
    Link,
    Heading,
    Quote,
    Bullet,
    Ordered,
    Task,
    /// Enter inside a list item
    Continue,
}

impl From<CliMode> for PrimaryMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Expression => PrimaryMode::Expression,
            CliMode::Text => PrimaryMode::Text,
            CliMode::Template => PrimaryMode::Template,
            CliMode::RawTemplate => PrimaryMode::RawTemplate,
            CliMode::Sql => PrimaryMode::Sql,
            CliMode::Number => PrimaryMode::Number,
        }
    }
}
