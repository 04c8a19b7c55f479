use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use chip_editor::codec::ModeConfig;
use chip_editor::editable::{CodeEngine, EditConstraints, Selection};
use chip_editor::keymap::load_default_keymap;
use chip_editor::modes::preview::render_html;
use chip_editor::template::{BlockType, CodeCommands, InlineMark, ListKind, StructuredEditing};

mod cli;

use cli::{CliArgs, CliCommand, FormatCommand};

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Run one command over `text`; returns the text unchanged if it did nothing
fn apply_format(text: &str, command: FormatCommand, level: u8, selection: Selection) -> String {
    let mut engine = CodeEngine::new(text, EditConstraints::multiline());
    let len = engine.len_chars();
    engine.set_selection(selection.clamp(len));

    let mut commands = CodeCommands::new(Some(&mut engine));
    let applied = match command {
        FormatCommand::Bold => commands.toggle_inline(InlineMark::Bold),
        FormatCommand::Italic => commands.toggle_inline(InlineMark::Italic),
        FormatCommand::Link => commands.toggle_inline(InlineMark::Link),
        FormatCommand::Heading => commands.toggle_block(BlockType::Heading(level.clamp(1, 6))),
        FormatCommand::Quote => commands.toggle_block(BlockType::Blockquote),
        FormatCommand::Bullet => commands.toggle_list(ListKind::Unordered),
        FormatCommand::Ordered => commands.toggle_list(ListKind::Ordered),
        FormatCommand::Task => commands.toggle_list(ListKind::Task),
        FormatCommand::Continue => commands.continue_list(),
    };
    if !applied {
        tracing::warn!(?command, "command did not apply");
    }
    engine.text()
}

fn main() -> Result<()> {
    chip_editor::tracing::init();

    let args = CliArgs::parse();
    tracing::debug!(?args, "starting");

    match args.command {
        CliCommand::Codec {
            mode,
            deserialize,
            value,
        } => {
            let config = ModeConfig::for_primary_mode(mode.into());
            let out = if deserialize {
                config.deserialize(&value)
            } else {
                config.serialize(&value)
            };
            println!("{out}");
        }
        CliCommand::Format {
            command,
            level,
            from,
            to,
            path,
        } => {
            let source = read_input(path.as_deref())?;
            let anchor = from.unwrap_or(0);
            let selection = Selection::new(anchor, to.unwrap_or(anchor));
            print!("{}", apply_format(&source, command, level, selection));
        }
        CliCommand::Preview { path } => {
            let source = read_input(path.as_deref())?;
            print!("{}", render_html(&source));
        }
        CliCommand::Keymap => {
            for binding in load_default_keymap() {
                println!("{:<16} {}", binding.keystroke.display_string(), binding.command);
            }
        }
    }

    Ok(())
}
