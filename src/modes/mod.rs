//! Mode router: picks one of four editor modes for a field and routes host
//! events and async results to it.
//!
//! Every mode receives the same [`ModeProps`] bag and reads only what it
//! needs. [`ModeView`] is a closed enum; adding an [`EditorMode`] without a
//! view arm fails to compile.

mod expanded;
mod expression;
mod link_dialog;
pub mod preview;
mod prompt;
mod template;
mod text;
mod toolbar;

pub use expanded::{ExpandedEditor, PointerTarget, PORTAL_CONTAINER_ID};
pub use expression::ExpressionMode;
pub use link_dialog::{DialogOutcome, LinkDialog, LinkField};
pub use prompt::{PromptMode, PromptView};
pub use template::{PreviewState, TemplateMode};
pub use text::TextMode;
pub use toolbar::{ButtonState, MarkdownToolbar, ToolbarAction, ToolbarOutcome, HEADING_LEVELS};

use crate::chip::{ChipEditor, CompletionItem, Transform};
use crate::codec::ModeConfig;
use crate::commands::{Cmd, EditorId};
use crate::config::EditorConfig;
use crate::field::FormField;
use crate::keymap::{Command, KeyContext, Keymap, Keystroke};
use crate::messages::Msg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorMode {
    Text,
    Prompt,
    Expression,
    Template,
}

impl EditorMode {
    pub const ALL: [EditorMode; 4] = [
        EditorMode::Text,
        EditorMode::Prompt,
        EditorMode::Expression,
        EditorMode::Template,
    ];
}

/// Explicit override wins; otherwise allow-listed keys get prompt mode and
/// everything else text mode
pub fn resolve_mode(field: &FormField, override_mode: Option<EditorMode>, prompt_keys: &[String]) -> EditorMode {
    override_mode.unwrap_or_else(|| {
        if prompt_keys.iter().any(|k| *k == field.key) {
            EditorMode::Prompt
        } else {
            EditorMode::Text
        }
    })
}

/// Everything a host can pass to a mode. Each mode reads a subset.
#[derive(Clone)]
pub struct ModeProps {
    pub field: FormField,
    pub value: String,
    pub mode: Option<EditorMode>,
    pub completions: Vec<CompletionItem>,
    pub file_name: Option<String>,
    /// Source lines the value belongs to; the first line anchors tokens
    pub target_line_range: Option<(u32, u32)>,
    pub sanitized_expression: Option<Transform>,
    pub raw_expression: Option<Transform>,
    pub helper_available: bool,
    pub extractor_available: bool,
    pub in_expanded_mode: bool,
    /// Host-owned validation messages, shown verbatim
    pub diagnostics: Vec<String>,
}

impl ModeProps {
    pub fn new(field: FormField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            mode: None,
            completions: Vec::new(),
            file_name: None,
            target_line_range: None,
            sanitized_expression: None,
            raw_expression: None,
            helper_available: true,
            extractor_available: false,
            in_expanded_mode: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: EditorMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

impl std::fmt::Debug for ModeProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeProps")
            .field("field", &self.field.key)
            .field("value", &self.value)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// What a key press did
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Handled(Option<Cmd>),
    /// The host should open the expanded editor
    RequestExpand,
    /// No binding; the host falls back to plain input
    Unhandled,
}

/// A chip editor configured from the props
fn chip_for(id: EditorId, config: ModeConfig, props: &ModeProps, settings: &EditorConfig) -> ChipEditor {
    let mut chip = ChipEditor::new(id, config, settings.clone());
    // Not mounted yet, so none of these return commands
    apply_host_props(&mut chip, props);
    chip
}

/// Push per-render props into a chip editor
fn apply_host_props(chip: &mut ChipEditor, props: &ModeProps) -> Option<Cmd> {
    chip.set_completions(props.completions.clone());
    chip.set_source(props.file_name.clone(), props.target_line_range.map(|(start, _)| start));
    chip.set_helper_available(props.helper_available);
    chip.set_extractor_available(props.extractor_available);
    chip.set_transforms(props.sanitized_expression.clone(), props.raw_expression.clone())
}

/// Commands every chip-backed mode understands
fn chip_command(chip: &mut ChipEditor, command: Command) -> KeyOutcome {
    match command {
        Command::Undo => KeyOutcome::Handled(chip.undo()),
        Command::Redo => KeyOutcome::Handled(chip.redo()),
        Command::Dismiss => KeyOutcome::Handled(chip.on_escape()),
        Command::ToggleHelper => KeyOutcome::Handled(chip.toggle_helper_from_keyboard()),
        Command::Expand => KeyOutcome::RequestExpand,
        _ => KeyOutcome::Unhandled,
    }
}

fn chip_context(chip: &ChipEditor) -> KeyContext {
    KeyContext {
        has_selection: chip.engine().is_some_and(|e| !e.selection().is_empty()),
        helper_open: chip.pane().is_open,
        ..KeyContext::default()
    }
}

/// The mounted component for one field
#[derive(Debug)]
pub enum ModeView {
    Text(TextMode),
    Prompt(PromptMode),
    Expression(ExpressionMode),
    Template(TemplateMode),
}

impl ModeView {
    /// Build the view for the resolved mode. Call [`ModeView::mount`] next.
    pub fn build(id: EditorId, props: &ModeProps, settings: &EditorConfig) -> Self {
        let mode = resolve_mode(&props.field, props.mode, &settings.prompt_field_keys);
        tracing::debug!(editor = id.0, field = %props.field.key, ?mode, "building mode view");
        match mode {
            EditorMode::Text => ModeView::Text(TextMode::new(id, props, settings)),
            EditorMode::Prompt => ModeView::Prompt(PromptMode::new(id, props, settings)),
            EditorMode::Expression => ModeView::Expression(ExpressionMode::new(id, props, settings)),
            EditorMode::Template => ModeView::Template(TemplateMode::new(id, props, settings)),
        }
    }

    pub fn mode(&self) -> EditorMode {
        match self {
            ModeView::Text(_) => EditorMode::Text,
            ModeView::Prompt(_) => EditorMode::Prompt,
            ModeView::Expression(_) => EditorMode::Expression,
            ModeView::Template(_) => EditorMode::Template,
        }
    }

    pub fn chip(&self) -> &ChipEditor {
        match self {
            ModeView::Text(m) => m.chip(),
            ModeView::Prompt(m) => m.chip(),
            ModeView::Expression(m) => m.chip(),
            ModeView::Template(m) => m.chip(),
        }
    }

    pub fn chip_mut(&mut self) -> &mut ChipEditor {
        match self {
            ModeView::Text(m) => m.chip_mut(),
            ModeView::Prompt(m) => m.chip_mut(),
            ModeView::Expression(m) => m.chip_mut(),
            ModeView::Template(m) => m.chip_mut(),
        }
    }

    pub fn id(&self) -> EditorId {
        self.chip().id()
    }

    pub fn mount(&mut self, value: &str) -> Option<Cmd> {
        match self {
            ModeView::Prompt(m) => m.mount(value),
            other => other.chip_mut().mount(value),
        }
    }

    pub fn unmount(&mut self) -> Option<Cmd> {
        match self {
            ModeView::Prompt(m) => m.unmount(),
            ModeView::Template(m) => m.unmount(),
            other => other.chip_mut().unmount(),
        }
    }

    /// The host re-rendered with new props. A different resolved mode
    /// replaces the view.
    pub fn set_props(&mut self, props: &ModeProps, settings: &EditorConfig) -> Option<Cmd> {
        let mode = resolve_mode(&props.field, props.mode, &settings.prompt_field_keys);
        if mode != self.mode() {
            tracing::debug!(editor = self.id().0, from = ?self.mode(), to = ?mode, "mode changed, rebuilding view");
            let id = self.id();
            let teardown = self.unmount();
            *self = ModeView::build(id, props, settings);
            return Cmd::batch([teardown, self.mount(&props.value)]);
        }

        let config = match self {
            ModeView::Expression(m) => m.set_field(&props.field),
            _ => None,
        };
        let host = apply_host_props(self.chip_mut(), props);
        let value = self.set_value(&props.value);
        Cmd::batch([config, host, value])
    }

    pub fn set_value(&mut self, value: &str) -> Option<Cmd> {
        match self {
            ModeView::Prompt(m) => m.set_value(value),
            other => other.chip_mut().set_value(value),
        }
    }

    /// Typed or pasted text
    pub fn type_text(&mut self, text: &str) -> Option<Cmd> {
        match self {
            ModeView::Prompt(m) => m.type_text(text),
            other => other.chip_mut().type_text(text),
        }
    }

    pub fn backspace(&mut self) -> Option<Cmd> {
        match self {
            ModeView::Prompt(m) => m.backspace(),
            other => other.chip_mut().backspace(),
        }
    }

    /// Enter with no binding claiming it
    pub fn enter(&mut self) -> Option<Cmd> {
        match self {
            ModeView::Prompt(m) => m.enter(),
            other => other.chip_mut().type_text("\n"),
        }
    }

    /// Look the keystroke up and run the bound command
    pub fn handle_key(&mut self, stroke: Keystroke, keymap: &Keymap) -> KeyOutcome {
        match self {
            ModeView::Prompt(m) => m.handle_key(stroke, keymap),
            ModeView::Template(m) => m.handle_key(stroke, keymap),
            ModeView::Text(_) | ModeView::Expression(_) => {
                let chip = self.chip_mut();
                match keymap.lookup(&stroke, &chip_context(chip)) {
                    Some(command) => chip_command(chip, command),
                    None => KeyOutcome::Unhandled,
                }
            }
        }
    }

    /// Whether Escape would close something inside the view
    pub fn has_overlay_open(&self) -> bool {
        match self {
            ModeView::Prompt(m) => m.has_overlay_open(),
            other => other.chip().pane().is_open,
        }
    }

    /// Close the topmost overlay inside the view
    pub fn dismiss(&mut self) -> Option<Cmd> {
        match self {
            ModeView::Prompt(m) => m.dismiss(),
            other => other.chip_mut().on_escape(),
        }
    }

    /// Route a worker result
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        match msg {
            Msg::DebounceElapsed { revision, .. } => self.chip_mut().debounce_elapsed(revision),
            Msg::TokensFetched {
                meta,
                replacement,
                result,
                ..
            } => {
                let cmd = self.chip_mut().handle_tokens(meta, replacement, result);
                if let ModeView::Prompt(m) = self {
                    m.resync_rich();
                }
                cmd
            }
            Msg::ArgsExtracted { request, result, .. } => self.chip_mut().handle_args(request, result),
            Msg::PreviewTokensFetched {
                request_id, result, ..
            } => match self {
                ModeView::Template(m) => m.handle_preview(request_id, result),
                other => {
                    tracing::debug!(editor = other.id().0, "preview tokens for a non-template view ignored");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn keys() -> Vec<String> {
        EditorConfig::default().prompt_field_keys
    }

    #[test]
    fn test_default_mode_by_key() {
        let prompt = FormField::new("instructions", FieldType::String);
        let other = FormField::new("timeout", FieldType::Number);
        assert_eq!(resolve_mode(&prompt, None, &keys()), EditorMode::Prompt);
        assert_eq!(resolve_mode(&other, None, &keys()), EditorMode::Text);
        assert_eq!(
            resolve_mode(&prompt, Some(EditorMode::Template), &keys()),
            EditorMode::Template
        );
    }

    #[test]
    fn test_every_mode_builds_its_view() {
        let settings = EditorConfig::default();
        for mode in EditorMode::ALL {
            let props = ModeProps::new(FormField::new("x", FieldType::Expression), "").with_mode(mode);
            let view = ModeView::build(EditorId(1), &props, &settings);
            assert_eq!(view.mode(), mode);
            assert!(!view.chip().is_mounted());
        }
    }
}
