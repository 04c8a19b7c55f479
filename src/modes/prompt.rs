//! Prompt mode: markdown prompts with a raw (source) view and a rich
//! (structured) view, an edit/preview switch and the formatting toolbar.
//!
//! The chip editor always holds the source. Rich edits are written back to
//! it as whole-document replacements, so the host sees one value stream
//! whichever view is showing.

use crate::chip::ChipEditor;
use crate::codec::ModeConfig;
use crate::commands::{Cmd, EditorId};
use crate::config::EditorConfig;
use crate::keymap::{Command, KeyCode, KeyContext, Keymap, Keystroke};
use crate::template::rich::{Point, RichEditor};
use crate::template::{ActiveQuery, ListKind, RichCommands, StructuredEditing};

use super::link_dialog::{DialogOutcome, LinkDialog};
use super::preview::render_html;
use super::template::toolbar_action;
use super::toolbar::{ButtonState, MarkdownToolbar, ToolbarAction, ToolbarOutcome};
use super::{chip_command, chip_context, chip_for, KeyOutcome, ModeProps};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptView {
    #[default]
    Raw,
    Rich,
}

#[derive(Debug)]
pub struct PromptMode {
    chip: ChipEditor,
    view: PromptView,
    rich: Option<RichEditor>,
    /// Source text the rich editor last agreed with
    rich_source: String,
    preview: Option<String>,
    toolbar: MarkdownToolbar,
    link_dialog: Option<LinkDialog>,
    undo_depth: usize,
}

impl PromptMode {
    pub fn new(id: EditorId, props: &ModeProps, settings: &EditorConfig) -> Self {
        Self {
            chip: chip_for(id, ModeConfig::for_field(&props.field), props, settings),
            view: PromptView::Raw,
            rich: None,
            rich_source: String::new(),
            preview: None,
            toolbar: MarkdownToolbar::default(),
            link_dialog: None,
            undo_depth: settings.undo_depth,
        }
    }

    pub fn chip(&self) -> &ChipEditor {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipEditor {
        &mut self.chip
    }

    pub fn view(&self) -> PromptView {
        self.view
    }

    pub fn rich(&self) -> Option<&RichEditor> {
        self.rich.as_ref()
    }

    /// Rendered preview HTML while previewing
    pub fn preview_html(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn toolbar(&self) -> &MarkdownToolbar {
        &self.toolbar
    }

    pub fn link_dialog(&self) -> Option<&LinkDialog> {
        self.link_dialog.as_ref()
    }

    pub fn has_overlay_open(&self) -> bool {
        self.link_dialog.is_some() || self.toolbar.is_dropdown_open() || self.chip.pane().is_open
    }

    // ------------------------------------------------------------------------
    // Lifecycle and host value
    // ------------------------------------------------------------------------

    pub fn mount(&mut self, value: &str) -> Option<Cmd> {
        let cmd = self.chip.mount(value);
        if self.view == PromptView::Rich {
            self.build_rich();
        }
        cmd
    }

    pub fn unmount(&mut self) -> Option<Cmd> {
        self.rich = None;
        self.link_dialog = None;
        self.preview = None;
        self.chip.unmount()
    }

    pub fn set_value(&mut self, value: &str) -> Option<Cmd> {
        let cmd = self.chip.set_value(value);
        self.resync_rich();
        cmd
    }

    /// Rebuild the rich document if the source changed underneath it
    /// (external replacement)
    pub fn resync_rich(&mut self) {
        if self.rich.is_none() {
            return;
        }
        let Some(text) = self.chip.text() else {
            return;
        };
        if text != self.rich_source {
            tracing::debug!(editor = self.chip.id().0, "source replaced, rebuilding rich document");
            self.build_rich();
        }
    }

    fn build_rich(&mut self) {
        let Some(text) = self.chip.text() else {
            return;
        };
        self.rich = Some(RichEditor::from_markdown(&text).with_max_undo(self.undo_depth));
        self.rich_source = text;
    }

    // ------------------------------------------------------------------------
    // View switches
    // ------------------------------------------------------------------------

    /// Raw to rich parses the source; rich to raw drops the rich document,
    /// whose edits are already in the source
    pub fn toggle_view(&mut self) -> Option<Cmd> {
        if !self.chip.is_mounted() {
            return None;
        }
        self.link_dialog = None;
        self.toolbar.close_dropdown();
        match self.view {
            PromptView::Raw => {
                self.view = PromptView::Rich;
                self.build_rich();
                tracing::debug!(editor = self.chip.id().0, "prompt switched to rich view");
                self.chip.on_escape()
            }
            PromptView::Rich => {
                self.view = PromptView::Raw;
                self.rich = None;
                tracing::debug!(editor = self.chip.id().0, "prompt switched to raw view");
                None
            }
        }
    }

    pub fn toggle_preview(&mut self) {
        if self.preview.take().is_some() {
            return;
        }
        if let Some(text) = self.chip.text() {
            self.preview = Some(render_html(&text));
        }
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Run an edit on the rich document and write the result to the source
    fn rich_edit(&mut self, edit: impl FnOnce(&mut RichEditor) -> bool) -> Option<Cmd> {
        let rich = self.rich.as_mut()?;
        let before = rich.revision();
        if !edit(rich) || rich.revision() == before {
            return None;
        }
        self.sync_source()
    }

    fn sync_source(&mut self) -> Option<Cmd> {
        let markdown = self.rich.as_ref()?.to_markdown();
        if self.chip.text().as_deref() == Some(markdown.as_str()) {
            return None;
        }
        self.rich_source = markdown.clone();
        self.chip.replace_document(&markdown, "input.rich")
    }

    pub fn type_text(&mut self, text: &str) -> Option<Cmd> {
        if self.preview.is_some() {
            return None;
        }
        if let Some(dialog) = self.link_dialog.as_mut() {
            dialog.insert_text(text);
            return None;
        }
        match self.view {
            PromptView::Raw => self.chip.type_text(text),
            PromptView::Rich => self.rich_edit(|rich| rich.insert_text(text)),
        }
    }

    pub fn backspace(&mut self) -> Option<Cmd> {
        if self.preview.is_some() {
            return None;
        }
        if let Some(dialog) = self.link_dialog.as_mut() {
            dialog.delete_backward();
            return None;
        }
        match self.view {
            PromptView::Raw => self.chip.backspace(),
            PromptView::Rich => self.rich_edit(RichEditor::delete_backward),
        }
    }

    /// Enter: continue a list when inside one, otherwise a new line/block
    pub fn enter(&mut self) -> Option<Cmd> {
        if self.preview.is_some() {
            return None;
        }
        if self.link_dialog.is_some() {
            return self.link_dialog_key(KeyCode::Enter);
        }
        match self.view {
            PromptView::Raw => self
                .chip
                .run_command(|c| c.continue_list())
                .or_else(|| self.chip.type_text("\n")),
            PromptView::Rich => self.rich_edit(RichEditor::split_block),
        }
    }

    /// Selection change in the rich view
    pub fn select_rich(&mut self, anchor: &Point, focus: &Point) -> bool {
        self.rich
            .as_mut()
            .is_some_and(|rich| rich.set_selection_points(anchor, focus))
    }

    /// Checkbox click on a task item in the rich view
    pub fn toggle_checked(&mut self) -> Option<Cmd> {
        self.rich_edit(RichEditor::toggle_checked)
    }

    // ------------------------------------------------------------------------
    // Toolbar and link dialog
    // ------------------------------------------------------------------------

    pub fn toolbar_buttons(&mut self, keymap: Option<&Keymap>) -> Vec<ButtonState> {
        let toolbar = &self.toolbar;
        match self.view {
            PromptView::Raw => self.chip.query_commands(|c| toolbar.buttons(c, keymap)),
            PromptView::Rich => toolbar.buttons(&RichCommands::new(self.rich.as_mut()), keymap),
        }
    }

    pub fn toggle_heading_dropdown(&mut self) {
        self.toolbar.toggle_dropdown();
    }

    pub fn apply_toolbar(&mut self, action: ToolbarAction) -> Option<Cmd> {
        if self.preview.is_some() && action != ToolbarAction::SwitchView {
            return None;
        }
        let toolbar = &mut self.toolbar;
        let (outcome, cmd) = match self.view {
            PromptView::Raw => {
                let mut outcome = ToolbarOutcome::Applied(false);
                let cmd = self.chip.run_command(|c| {
                    outcome = toolbar.apply(action, c);
                    outcome == ToolbarOutcome::Applied(true)
                });
                (outcome, cmd)
            }
            PromptView::Rich => {
                let rich = self.rich.as_mut()?;
                let before = rich.revision();
                let outcome = toolbar.apply(action, &mut RichCommands::new(Some(&mut *rich)));
                let cmd = if rich.revision() != before {
                    self.sync_source()
                } else {
                    None
                };
                (outcome, cmd)
            }
        };
        match outcome {
            ToolbarOutcome::Applied(_) => cmd,
            ToolbarOutcome::NeedsLinkTarget => {
                self.open_link_dialog();
                cmd
            }
            ToolbarOutcome::SwitchView => Cmd::batch([cmd, self.toggle_view()]),
        }
    }

    fn open_link_dialog(&mut self) {
        let Some(rich) = self.rich.as_ref() else {
            return;
        };
        self.link_dialog = Some(LinkDialog::open(&rich.selected_text(), rich.link_at_selection()));
    }

    /// Key press while the link dialog is open
    pub fn link_dialog_key(&mut self, key: KeyCode) -> Option<Cmd> {
        let outcome = self.link_dialog.as_mut()?.on_key(key);
        match outcome {
            DialogOutcome::Pending => None,
            DialogOutcome::Cancelled => {
                self.link_dialog = None;
                None
            }
            DialogOutcome::Confirmed { url, title } => {
                self.link_dialog = None;
                self.confirm_link(&url, title.as_deref())
            }
        }
    }

    /// Apply a confirmed link. The title is the link text: it replaces a
    /// selection it differs from, or is inserted at a collapsed caret.
    fn confirm_link(&mut self, url: &str, title: Option<&str>) -> Option<Cmd> {
        self.rich_edit(|rich| {
            let collapsed = rich.selection().is_collapsed();
            if collapsed {
                return rich.set_link(url, title);
            }
            if let Some(title) = title.filter(|t| *t != rich.selected_text() && !t.contains('\n')) {
                if !rich.insert_text(title) {
                    return false;
                }
                let caret = rich.selection().focus;
                let len = title.chars().count();
                rich.select_in_block(caret.block, caret.offset.saturating_sub(len), caret.offset);
            }
            rich.set_link(url, None)
        })
    }

    // ------------------------------------------------------------------------
    // Keys and dismissal
    // ------------------------------------------------------------------------

    fn key_context(&mut self) -> KeyContext {
        let mut ctx = chip_context(&self.chip);
        ctx.dialog_open = self.link_dialog.is_some();
        match self.view {
            PromptView::Raw => {
                ctx.in_list_item = self
                    .chip
                    .query_commands(|c| ListKind::ALL.iter().any(|&k| c.is_active(ActiveQuery::List(k))));
            }
            PromptView::Rich => {
                ctx.rich_view = true;
                if let Some(rich) = &self.rich {
                    ctx.has_selection = !rich.selection().is_collapsed();
                    ctx.in_list_item = rich.in_list_item();
                }
            }
        }
        ctx
    }

    pub fn handle_key(&mut self, stroke: Keystroke, keymap: &Keymap) -> KeyOutcome {
        // The dialog owns the keyboard while open
        if self.link_dialog.is_some() {
            return KeyOutcome::Handled(self.link_dialog_key(stroke.key));
        }

        let ctx = self.key_context();
        let Some(command) = keymap.lookup(&stroke, &ctx) else {
            return KeyOutcome::Unhandled;
        };
        tracing::trace!(editor = self.chip.id().0, %command, "prompt key");

        match command {
            Command::ContinueList => KeyOutcome::Handled(self.enter()),
            Command::ToggleRawView => KeyOutcome::Handled(self.toggle_view()),
            Command::TogglePreview => {
                self.toggle_preview();
                KeyOutcome::Handled(None)
            }
            Command::Dismiss => KeyOutcome::Handled(self.dismiss()),
            Command::Undo => KeyOutcome::Handled(self.apply_toolbar(ToolbarAction::Undo)),
            Command::Redo => KeyOutcome::Handled(self.apply_toolbar(ToolbarAction::Redo)),
            other => match toolbar_action(other) {
                Some(action) => KeyOutcome::Handled(self.apply_toolbar(action)),
                None => chip_command(&mut self.chip, other),
            },
        }
    }

    /// Close the link dialog, then the heading dropdown, then the pane
    pub fn dismiss(&mut self) -> Option<Cmd> {
        if self.link_dialog.take().is_some() {
            return None;
        }
        if self.toolbar.is_dropdown_open() {
            self.toolbar.close_dropdown();
            return None;
        }
        self.chip.on_escape()
    }
}
