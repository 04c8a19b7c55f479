//! Template mode: markdown template editing with an async preview.

use crate::chip::ChipEditor;
use crate::codec::ModeConfig;
use crate::commands::{Cmd, EditorId};
use crate::config::EditorConfig;
use crate::field::FieldType;
use crate::keymap::{Command, Keymap, Keystroke};
use crate::rpc::RpcError;
use crate::template::{ActiveQuery, ListKind, StructuredEditing};
use crate::tokens::TokenStream;

use super::preview::{reconstruct_chips, render_fallback, render_html};
use super::toolbar::{MarkdownToolbar, ToolbarAction, ToolbarOutcome};
use super::{chip_command, chip_context, chip_for, KeyOutcome, ModeProps};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Editing,
    /// Waiting for preview tokens
    Loading { request_id: u64 },
    Rendered { html: String },
    /// Tokenizer failed: sanitized text verbatim
    Fallback { html: String },
}

impl PreviewState {
    pub fn is_previewing(&self) -> bool {
        !matches!(self, PreviewState::Editing)
    }
}

#[derive(Debug)]
pub struct TemplateMode {
    chip: ChipEditor,
    preview: PreviewState,
    last_request_id: u64,
    toolbar: MarkdownToolbar,
}

impl TemplateMode {
    pub fn new(id: EditorId, props: &ModeProps, settings: &EditorConfig) -> Self {
        let config = match props.field.value_type {
            FieldType::RawTemplate | FieldType::Sql => ModeConfig::for_field(&props.field),
            _ => ModeConfig::string_template(),
        };
        Self {
            chip: chip_for(id, config, props, settings),
            preview: PreviewState::Editing,
            last_request_id: 0,
            toolbar: MarkdownToolbar::default(),
        }
    }

    pub fn chip(&self) -> &ChipEditor {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipEditor {
        &mut self.chip
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    pub fn toolbar(&self) -> &MarkdownToolbar {
        &self.toolbar
    }

    pub fn unmount(&mut self) -> Option<Cmd> {
        self.preview = PreviewState::Editing;
        self.chip.unmount()
    }

    /// Ask for preview tokens of the current value
    pub fn enter_preview(&mut self) -> Option<Cmd> {
        if !self.chip.is_mounted() {
            return None;
        }
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.preview = PreviewState::Loading { request_id };
        tracing::debug!(editor = self.chip.id().0, request_id, "preview requested");
        Some(Cmd::FetchPreviewTokens {
            editor: self.chip.id(),
            request_id,
            query: self.chip.token_query(),
        })
    }

    pub fn exit_preview(&mut self) {
        self.preview = PreviewState::Editing;
    }

    pub fn toggle_preview(&mut self) -> Option<Cmd> {
        if self.preview.is_previewing() {
            self.exit_preview();
            None
        } else {
            self.enter_preview()
        }
    }

    /// Preview tokens arrived. Only the latest request counts; failures
    /// fall back to the sanitized text.
    pub fn handle_preview(&mut self, request_id: u64, result: Result<Option<TokenStream>, RpcError>) -> Option<Cmd> {
        if self.preview != (PreviewState::Loading { request_id }) {
            tracing::debug!(editor = self.chip.id().0, request_id, "stale preview response ignored");
            return None;
        }
        let display = self.chip.displayed_value();
        self.preview = match result {
            Ok(Some(mut stream)) => {
                stream.adjust_for_prefix(self.chip.config().prefix_len());
                let tokens = stream.decode(&display);
                PreviewState::Rendered {
                    html: render_html(&reconstruct_chips(&display, &tokens)),
                }
            }
            Ok(None) => PreviewState::Rendered {
                html: render_html(&display),
            },
            Err(e) => {
                tracing::warn!(editor = self.chip.id().0, "preview tokenizer failed: {}", e);
                PreviewState::Fallback {
                    html: render_fallback(&display),
                }
            }
        };
        None
    }

    /// Toolbar press over the source text
    pub fn apply_toolbar(&mut self, action: ToolbarAction) -> Option<Cmd> {
        if action == ToolbarAction::SwitchView {
            return self.toggle_preview();
        }
        if self.preview.is_previewing() {
            return None;
        }
        let toolbar = &mut self.toolbar;
        self.chip
            .run_command(|commands| toolbar.apply(action, commands) == ToolbarOutcome::Applied(true))
    }

    pub fn handle_key(&mut self, stroke: Keystroke, keymap: &Keymap) -> KeyOutcome {
        let mut ctx = chip_context(&self.chip);
        ctx.in_list_item = self
            .chip
            .query_commands(|c| ListKind::ALL.iter().any(|&k| c.is_active(ActiveQuery::List(k))));
        let Some(command) = keymap.lookup(&stroke, &ctx) else {
            return KeyOutcome::Unhandled;
        };
        match command {
            Command::TogglePreview => KeyOutcome::Handled(self.toggle_preview()),
            Command::ContinueList => {
                KeyOutcome::Handled(self.chip.run_command(|c| c.continue_list()).or_else(|| self.chip.type_text("\n")))
            }
            other => match toolbar_action(other) {
                Some(action) => KeyOutcome::Handled(self.apply_toolbar(action)),
                None => chip_command(&mut self.chip, other),
            },
        }
    }
}

/// Formatting commands as toolbar presses
pub(super) fn toolbar_action(command: Command) -> Option<ToolbarAction> {
    let action = match command {
        Command::ToggleBold => ToolbarAction::Bold,
        Command::ToggleItalic => ToolbarAction::Italic,
        Command::InsertLink => ToolbarAction::Link,
        Command::ToggleHeading(level) => ToolbarAction::HeadingLevel(level),
        Command::ToggleBlockquote => ToolbarAction::Blockquote,
        Command::ToggleBulletList => ToolbarAction::BulletList,
        Command::ToggleOrderedList => ToolbarAction::OrderedList,
        Command::ToggleTaskList => ToolbarAction::TaskList,
        _ => return None,
    };
    Some(action)
}
