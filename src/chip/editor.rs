//! One mounted chip editor: engine lifecycle, value reconciliation, token
//! refresh scheduling, helper pane and helper insertion.
//!
//! Every entry point returns the side effects it needs as `Option<Cmd>`.
//! Calls made before `mount` or after `unmount` do nothing, and so do async
//! results that land after `unmount`.

use std::fmt;
use std::sync::Arc;

use crate::codec::sql::{SqlHighlighter, SqlSpan};
use crate::codec::{EditorExtension, ModeConfig};
use crate::commands::{ArgsRequest, Cmd, EditorId};
use crate::config::EditorConfig;
use crate::editable::{Change, ChangeEvent, CodeEngine, Selection, StateEffect, Transaction};
use crate::overlay::{layout_floating_actions, FloatingButton, PaneView, Point, Rect};
use crate::rpc::{FunctionSignature, RpcError, TokenQuery};
use crate::template::CodeCommands;
use crate::tokens::{layout_chips, Chip, RefreshReason, RequestMeta, Resolution, TokenStream, TokenSync};
use crate::tracing::SelectionSnapshot;

use super::completion::{filter_completions, CompletionItem, CompletionKind};
use super::helper::{anchor_below, should_open_after_change, DismissTargets, HelperOptions, HelperPaneState};
use super::mailbox::SelectionMailbox;

/// Host-supplied text transform (sanitized display, raw expression)
pub type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

fn same_transform(a: &Option<Transform>, b: &Option<Transform>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

pub struct ChipEditor {
    id: EditorId,
    config: ModeConfig,
    settings: EditorConfig,
    engine: Option<CodeEngine>,
    sync: TokenSync,
    pane: HelperPaneState,
    mailbox: SelectionMailbox,
    listener_attached: bool,
    /// Last value known to the host, in external form
    value: String,
    file_name: Option<String>,
    start_line: Option<u32>,
    completions: Vec<CompletionItem>,
    sanitize: Option<Transform>,
    raw: Option<Transform>,
    focused: bool,
    helper_available: bool,
    extractor_available: bool,
    sql: Option<SqlHighlighter>,
    layout: DismissTargets,
    viewport_width: f32,
}

impl fmt::Debug for ChipEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChipEditor")
            .field("id", &self.id)
            .field("config", &self.config.kind)
            .field("mounted", &self.engine.is_some())
            .field("value", &self.value)
            .field("pane", &self.pane)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl ChipEditor {
    pub fn new(id: EditorId, config: ModeConfig, settings: EditorConfig) -> Self {
        Self {
            id,
            config,
            settings,
            engine: None,
            sync: TokenSync::new(),
            pane: HelperPaneState::default(),
            mailbox: SelectionMailbox::new(),
            listener_attached: false,
            value: String::new(),
            file_name: None,
            start_line: None,
            completions: Vec::new(),
            sanitize: None,
            raw: None,
            focused: false,
            helper_available: true,
            extractor_available: false,
            sql: None,
            layout: DismissTargets::default(),
            viewport_width: f32::MAX,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn id(&self) -> EditorId {
        self.id
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn engine(&self) -> Option<&CodeEngine> {
        self.engine.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Displayed document text, if mounted
    pub fn text(&self) -> Option<String> {
        self.engine.as_ref().map(CodeEngine::text)
    }

    pub fn sync(&self) -> &TokenSync {
        &self.sync
    }

    pub fn pane(&self) -> HelperPaneState {
        self.pane
    }

    pub fn mailbox(&self) -> &SelectionMailbox {
        &self.mailbox
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn pane_view(&self) -> Option<PaneView> {
        if !self.helper_available {
            return None;
        }
        let pane = &self.settings.helper_pane;
        self.pane.view(pane.width, pane.height)
    }

    pub fn floating_actions(&self, in_expanded_mode: bool) -> Vec<FloatingButton> {
        layout_floating_actions(self.layout.editor, in_expanded_mode, self.helper_available)
    }

    /// Chips over the displayed text
    pub fn chips(&self) -> Vec<Chip> {
        match &self.engine {
            Some(engine) => layout_chips(&engine.text(), engine.tokens()),
            None => Vec::new(),
        }
    }

    /// SQL highlight spans, when the SQL extension is active
    pub fn sql_spans(&mut self) -> Vec<SqlSpan> {
        if !self.config.has_extension(EditorExtension::SqlSyntax) {
            return Vec::new();
        }
        let Some(engine) = &self.engine else {
            return Vec::new();
        };
        if self.sql.is_none() {
            match SqlHighlighter::new() {
                Ok(highlighter) => self.sql = Some(highlighter),
                Err(e) => {
                    tracing::warn!("SQL highlighting unavailable: {:#}", e);
                    return Vec::new();
                }
            }
        }
        let text = engine.text();
        self.sql.as_mut().map(|h| h.highlight(&text)).unwrap_or_default()
    }

    /// Completions matching the word before the cursor
    pub fn completions_for_cursor(&self) -> Vec<&CompletionItem> {
        let query = self
            .engine
            .as_ref()
            .map(CodeEngine::word_before_cursor)
            .unwrap_or_default();
        filter_completions(&self.completions, &query)
    }

    // ------------------------------------------------------------------------
    // Host props
    // ------------------------------------------------------------------------

    pub fn set_completions(&mut self, completions: Vec<CompletionItem>) {
        self.completions = completions;
    }

    pub fn set_source(&mut self, file_name: Option<String>, start_line: Option<u32>) {
        self.file_name = file_name;
        self.start_line = start_line;
    }

    pub fn set_helper_available(&mut self, available: bool) {
        self.helper_available = available;
    }

    pub fn set_extractor_available(&mut self, available: bool) {
        self.extractor_available = available;
    }

    /// Host geometry used for pane anchoring and outside-click checks
    pub fn set_layout(&mut self, targets: DismissTargets, viewport_width: f32) {
        self.layout = targets;
        self.viewport_width = viewport_width;
    }

    /// The host value as the document should show it
    pub fn displayed_value(&self) -> String {
        self.display(&self.value)
    }

    /// Tokenizer query for the current host value
    pub fn token_query(&self) -> TokenQuery {
        TokenQuery {
            value: self.config.deserialize(&self.value),
            file_name: self.file_name.clone(),
            start_line: self.start_line,
        }
    }

    fn display(&self, value: &str) -> String {
        let shown = self.config.serialize(value);
        match &self.sanitize {
            Some(sanitize) => sanitize(&shown),
            None => shown,
        }
    }

    fn outgoing(&self, document: &str) -> String {
        let raw = match &self.raw {
            Some(raw) => raw(document),
            None => document.to_string(),
        };
        self.config.deserialize(&raw)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Create a fresh engine showing `value`. A previous engine is dropped
    /// first; nothing carries over between mounts.
    pub fn mount(&mut self, value: &str) -> Option<Cmd> {
        if self.engine.take().is_some() {
            tracing::debug!(editor = self.id.0, "remount: previous engine destroyed");
        }
        self.sync.reset();
        self.mailbox.clear();

        let mut correction = None;
        let value = if self.config.is_value_compatible(value) {
            value.to_string()
        } else {
            let corrected = self.config.correct_value(value);
            tracing::debug!(editor = self.id.0, value, %corrected, "incompatible value corrected on mount");
            correction = Some(corrected.clone());
            corrected
        };

        let display = self.display(&value);
        let engine = CodeEngine::new(&display, self.config.constraints(self.settings.undo_depth));
        let cursor = engine.selection().head;
        self.engine = Some(engine);
        self.value = value;
        tracing::debug!(editor = self.id.0, kind = ?self.config.kind, "editor mounted");

        self.sync.mark_owed(RefreshReason::Mount);
        let editor = self.id;
        Cmd::batch([
            correction.map(|value| Cmd::EmitChange {
                editor,
                value,
                cursor,
            }),
            self.request_tokens(false),
        ])
    }

    pub fn unmount(&mut self) -> Option<Cmd> {
        if self.engine.take().is_none() {
            return None;
        }
        tracing::debug!(editor = self.id.0, "editor unmounted");
        self.sync.reset();
        self.mailbox.clear();
        self.focused = false;
        self.close_pane()
    }

    // ------------------------------------------------------------------------
    // Value reconciliation and token refresh
    // ------------------------------------------------------------------------

    /// The host re-rendered with `value`
    pub fn set_value(&mut self, value: &str) -> Option<Cmd> {
        if self.sync.take_echo(value) {
            tracing::trace!(editor = self.id.0, "value echo ignored");
            self.value = value.to_string();
            return None;
        }
        if !self.config.is_value_compatible(value) {
            let corrected = self.config.correct_value(value);
            tracing::debug!(editor = self.id.0, value, %corrected, "incompatible value, requesting correction");
            let cursor = self.engine.as_ref().map_or(0, |e| e.selection().head);
            return Some(Cmd::EmitChange {
                editor: self.id,
                value: corrected,
                cursor,
            });
        }
        self.value = value.to_string();
        self.reconcile()
    }

    /// Swap the sanitize/raw transforms. A changed identity owes a refresh.
    pub fn set_transforms(&mut self, sanitize: Option<Transform>, raw: Option<Transform>) -> Option<Cmd> {
        if same_transform(&self.sanitize, &sanitize) && same_transform(&self.raw, &raw) {
            return None;
        }
        self.sanitize = sanitize;
        self.raw = raw;
        if self.engine.is_none() {
            return None;
        }
        self.sync.mark_owed(RefreshReason::TransformChanged);
        self.reconcile()
    }

    /// Switch mode configuration (e.g. the field's type changed)
    pub fn set_config(&mut self, config: ModeConfig) -> Option<Cmd> {
        if config == self.config {
            return None;
        }
        tracing::debug!(editor = self.id.0, from = ?self.config.kind, to = ?config.kind, "mode configuration changed");
        self.config = config;
        self.sql = None;
        let constraints = self.config.constraints(self.settings.undo_depth);
        let engine = self.engine.as_mut()?;
        engine.set_constraints(constraints);
        self.sync.mark_owed(RefreshReason::TransformChanged);
        if !self.config.is_value_compatible(&self.value) {
            let value = self.value.clone();
            return self.set_value(&value);
        }
        self.reconcile()
    }

    /// Compare the host value with the document and fetch what is owed
    fn reconcile(&mut self) -> Option<Cmd> {
        let engine = self.engine.as_ref()?;
        let display = self.display(&self.value);
        if engine.text() != display {
            tracing::debug!(editor = self.id.0, "external update");
            self.sync.mark_owed(RefreshReason::ExternalUpdate);
            return self.request_tokens(true);
        }
        self.request_tokens(false)
    }

    /// Issue a token fetch if one is owed. External requests carry the
    /// replacement text and always go out.
    fn request_tokens(&mut self, external: bool) -> Option<Cmd> {
        let engine = self.engine.as_ref()?;
        let document = engine.text();
        let display = self.display(&self.value);
        if !external && !self.sync.needs_fetch(&document, &display) {
            tracing::trace!(editor = self.id.0, "token fetch skipped: nothing owed");
            return None;
        }
        let meta = self.sync.begin(engine.revision(), external)?;
        let (value, replacement) = if external {
            (self.config.deserialize(&self.value), Some(display))
        } else {
            (self.outgoing(&document), None)
        };
        Some(Cmd::FetchTokens {
            editor: self.id,
            meta,
            query: TokenQuery {
                value,
                file_name: self.file_name.clone(),
                start_line: self.start_line,
            },
            replacement,
        })
    }

    /// The debounce window after an edit closed
    pub fn debounce_elapsed(&mut self, revision: u64) -> Option<Cmd> {
        let engine = self.engine.as_ref()?;
        if engine.revision() != revision {
            tracing::trace!(
                editor = self.id.0,
                "skipping stale debounce: revision {} != {}",
                engine.revision(),
                revision
            );
            return None;
        }
        if !self.sync.is_owed() {
            return None;
        }
        self.request_tokens(false)
    }

    /// A token request settled
    pub fn handle_tokens(
        &mut self,
        meta: RequestMeta,
        replacement: Option<String>,
        result: Result<Option<TokenStream>, RpcError>,
    ) -> Option<Cmd> {
        let Some(engine) = self.engine.as_mut() else {
            tracing::debug!(id = meta.id, "token response after unmount ignored");
            return None;
        };

        let replace = meta.external_update && meta.revision == engine.revision();
        let stream = match result {
            Ok(stream) => {
                if self.sync.resolve(meta, engine.revision()) == Resolution::Stale {
                    return None;
                }
                stream
            }
            Err(e) => {
                tracing::warn!(editor = self.id.0, "expression tokenizer failed: {}", e);
                self.sync.fail(meta);
                // Previous tokens stay; only a pending replacement goes through
                if !replace {
                    return None;
                }
                None
            }
        };

        let text = match (&replacement, replace) {
            (Some(text), true) => text.clone(),
            _ => engine.text(),
        };
        let tokens = match stream {
            Some(mut stream) => {
                stream.adjust_for_prefix(self.config.prefix_len());
                stream.decode(&text)
            }
            None => Vec::new(),
        };

        let tr = match replacement {
            Some(text) if replace => {
                let len = engine.len_chars();
                let cursor = text.chars().count();
                Transaction::new(vec![Change::replace(0, len, text)])
                    .with_selection(Selection::cursor(cursor))
                    .external()
                    .user_event("external")
            }
            _ => Transaction::new(Vec::new()).external(),
        };
        engine.dispatch(tr.with_effect(StateEffect::SetTokens(tokens)));
        // A newer host value may have arrived while this replacement was in flight
        if replace && engine.text() != self.display(&self.value) {
            tracing::debug!(editor = self.id.0, "host value moved on during replacement");
            return self.reconcile();
        }
        None
    }

    // ------------------------------------------------------------------------
    // User edits
    // ------------------------------------------------------------------------

    /// Typing or paste at the selection
    pub fn type_text(&mut self, text: &str) -> Option<Cmd> {
        let event = self.engine.as_mut()?.insert_text(text)?;
        self.after_edit(event, true)
    }

    pub fn backspace(&mut self) -> Option<Cmd> {
        let event = self.engine.as_mut()?.delete_backward()?;
        self.after_edit(event, true)
    }

    pub fn delete_forward(&mut self) -> Option<Cmd> {
        let event = self.engine.as_mut()?.delete_forward()?;
        self.after_edit(event, true)
    }

    /// Any other user transaction
    pub fn dispatch(&mut self, tr: Transaction) -> Option<Cmd> {
        let engine = self.engine.as_mut()?;
        let before = SelectionSnapshot::from_engine(engine);
        let event = engine.dispatch(tr)?;
        if let Some(diff) = before.diff(&SelectionSnapshot::from_engine(engine)) {
            tracing::debug!(target: "selection", editor = self.id.0, %diff, "state changed");
        }
        self.after_edit(event, true)
    }

    pub fn undo(&mut self) -> Option<Cmd> {
        let engine = self.engine.as_mut()?;
        if !engine.undo() {
            return None;
        }
        self.emit_user_change(false)
    }

    pub fn redo(&mut self) -> Option<Cmd> {
        let engine = self.engine.as_mut()?;
        if !engine.redo() {
            return None;
        }
        self.emit_user_change(false)
    }

    /// Run a markdown command against the engine and report the edit
    pub fn run_command(&mut self, command: impl FnOnce(&mut CodeCommands<'_>) -> bool) -> Option<Cmd> {
        let engine = self.engine.as_mut()?;
        let before = engine.revision();
        let applied = command(&mut CodeCommands::new(Some(&mut *engine)));
        if applied && engine.revision() != before {
            self.emit_user_change(false)
        } else {
            None
        }
    }

    /// Replace the whole document as a user edit (rich view sync)
    pub fn replace_document(&mut self, text: &str, user_event: &'static str) -> Option<Cmd> {
        let engine = self.engine.as_mut()?;
        let len = engine.len_chars();
        let cursor = text.chars().count();
        let tr = Transaction::new(vec![Change::replace(0, len, text)])
            .with_selection(Selection::cursor(cursor))
            .user_event(user_event);
        let event = engine.dispatch(tr)?;
        self.after_edit(event, false)
    }

    /// Read-only command queries (toolbar state). Detached before mount.
    pub fn query_commands<R>(&mut self, query: impl FnOnce(&CodeCommands<'_>) -> R) -> R {
        query(&CodeCommands::new(self.engine.as_mut()))
    }

    /// Selection moved without a document change
    pub fn on_selection(&mut self, selection: Selection) -> Option<Cmd> {
        let event = self.engine.as_mut()?.set_selection(selection)?;
        if event.selection_changed && !selection.is_empty() {
            return self.open_pane(None);
        }
        None
    }

    pub fn select_all(&mut self) -> Option<Cmd> {
        let len = self.engine.as_ref()?.len_chars();
        self.on_selection(Selection::new(0, len))
    }

    fn after_edit(&mut self, event: ChangeEvent, decide_pane: bool) -> Option<Cmd> {
        if event.external {
            return None;
        }
        if !event.doc_changed {
            return None;
        }
        self.emit_user_change(decide_pane)
    }

    /// Forward the document upward, owe a refresh and schedule it
    fn emit_user_change(&mut self, decide_pane: bool) -> Option<Cmd> {
        let engine = self.engine.as_ref()?;
        let document = engine.text();
        let selection = engine.selection();
        let revision = engine.revision();
        let value = self.outgoing(&document);

        self.value = value.clone();
        self.sync.record_emit(&value);
        self.sync.mark_owed(RefreshReason::Edit);

        let pane = if decide_pane {
            if should_open_after_change(&document, selection, &self.settings.trigger_characters) {
                self.open_pane(None)
            } else {
                self.close_pane()
            }
        } else {
            None
        };

        Cmd::batch([
            Some(Cmd::EmitChange {
                editor: self.id,
                value,
                cursor: selection.head,
            }),
            Some(Cmd::DebouncedTokenRefresh {
                editor: self.id,
                revision,
                delay_ms: self.settings.token_debounce_ms,
            }),
            pane,
        ])
    }

    // ------------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------------

    pub fn on_focus(&mut self) -> Option<Cmd> {
        self.engine.as_ref()?;
        self.focused = true;
        self.open_pane(None)
    }

    /// Focus left the editor. A blur into the helper pane is not a real
    /// focus-out.
    pub fn on_blur(&mut self, into_overlay: bool) -> Option<Cmd> {
        self.engine.as_ref()?;
        if into_overlay {
            return None;
        }
        self.focused = false;
        self.sync.mark_owed(RefreshReason::FocusOut);
        self.request_tokens(false)
    }

    // ------------------------------------------------------------------------
    // Helper pane
    // ------------------------------------------------------------------------

    /// Open the pane, saving the live selection for a later insertion.
    /// `at` positions the pane; `None` keeps the last position.
    fn open_pane(&mut self, at: Option<(f32, f32)>) -> Option<Cmd> {
        if !self.helper_available {
            return None;
        }
        let engine = self.engine.as_ref()?;
        self.mailbox.store(engine.selection());
        if let Some((top, left)) = at {
            self.pane.top = top;
            self.pane.left = left;
        }
        if self.pane.is_open {
            return None;
        }
        self.pane.is_open = true;
        tracing::debug!(editor = self.id.0, "helper pane opened");
        self.attach_listener()
    }

    fn close_pane(&mut self) -> Option<Cmd> {
        if !self.pane.is_open {
            return None;
        }
        self.pane.is_open = false;
        tracing::debug!(editor = self.id.0, "helper pane closed");
        self.detach_listener()
    }

    fn attach_listener(&mut self) -> Option<Cmd> {
        if self.listener_attached {
            return None;
        }
        self.listener_attached = true;
        Some(Cmd::AttachDismissListener { editor: self.id })
    }

    fn detach_listener(&mut self) -> Option<Cmd> {
        if !self.listener_attached {
            return None;
        }
        self.listener_attached = false;
        Some(Cmd::DetachDismissListener { editor: self.id })
    }

    /// The floating helper button was pressed
    pub fn toggle_helper(&mut self, button: Rect, container: Rect) -> Option<Cmd> {
        if self.pane.is_open {
            return self.close_pane();
        }
        let pane = &self.settings.helper_pane;
        let at = anchor_below(button, container, pane.width, self.viewport_width, pane.margin);
        self.open_pane(Some(at))
    }

    /// Keyboard toggle: anchors to the floating button, or the editor corner
    pub fn toggle_helper_from_keyboard(&mut self) -> Option<Cmd> {
        let button = self.layout.toggle.unwrap_or(self.layout.editor);
        let container = self.layout.editor;
        self.toggle_helper(button, container)
    }

    /// A pointer-down reached the document while the pane was open
    pub fn on_pointer_down(&mut self, p: Point) -> Option<Cmd> {
        if !self.pane.is_open {
            return None;
        }
        let targets = DismissTargets {
            pane: self
                .pane_view()
                .map(|view| view.bounds(self.layout.editor))
                .or(self.layout.pane),
            ..self.layout
        };
        if targets.is_outside(p) {
            return self.close_pane();
        }
        None
    }

    pub fn on_escape(&mut self) -> Option<Cmd> {
        self.close_pane()
    }

    // ------------------------------------------------------------------------
    // Helper insertion
    // ------------------------------------------------------------------------

    /// The helper pane chose `value`
    pub fn insert_helper(&mut self, value: &str, kind: Option<CompletionKind>, options: HelperOptions) -> Option<Cmd> {
        let engine = self.engine.as_ref()?;
        let len = engine.len_chars();
        let selection = match self.mailbox.take() {
            Some(saved) => saved.clamp(len),
            None => {
                tracing::warn!(editor = self.id.0, "helper insertion without a saved selection, using live selection");
                engine.selection()
            }
        };

        let text = self.config.helper_value(value, kind);
        let (from, to) = if options.replace_full_text {
            (0, len)
        } else if selection.is_empty() {
            engine
                .tokens()
                .iter()
                .find(|t| t.start < selection.head && selection.head <= t.end())
                .map_or((selection.head, selection.head), |t| (t.start, t.end()))
        } else {
            (selection.from(), selection.to())
        };
        let cursor = from + text.chars().count();

        let tr = Transaction::new(vec![Change::replace(from, to, text.clone())])
            .with_selection(Selection::cursor(cursor))
            .user_event("input.helper");
        let engine = self.engine.as_mut()?;
        let Some(event) = engine.dispatch(tr) else {
            tracing::debug!(editor = self.id.0, "helper insertion rejected by constraints");
            return None;
        };
        let revision = event.revision;

        let edit = self.after_edit(event, false);
        let close = if options.close_helper_pane {
            self.close_pane()
        } else {
            // Keep the pane usable for a follow-up choice
            self.mailbox.store(Selection::cursor(cursor));
            None
        };

        let args = (self.extractor_available && (value.ends_with("()") || value.ends_with(")}")))
            .then(|| args_request(&text, from, revision))
            .flatten()
            .map(|request| Cmd::ExtractArgs {
                editor: self.id,
                request,
            });

        Cmd::batch([edit, close, args])
    }

    /// The argument extractor answered for an inserted call
    pub fn handle_args(&mut self, request: ArgsRequest, result: Result<FunctionSignature, RpcError>) -> Option<Cmd> {
        let engine = self.engine.as_mut()?;
        let signature = match result {
            Ok(signature) => signature,
            Err(e) => {
                tracing::warn!(editor = self.id.0, "argument extraction failed: {}", e);
                return None;
            }
        };
        if signature.args.is_empty() {
            return None;
        }
        if engine.revision() != request.revision {
            tracing::debug!(editor = self.id.0, "argument placeholders skipped: document changed");
            return None;
        }

        let inserted_len = request.inserted.chars().count();
        let end = request.insert_from + inserted_len;
        if end > engine.len_chars() || engine.doc().slice(request.insert_from..end) != request.inserted.as_str() {
            return None;
        }
        let (rewritten, cursor) = with_placeholders(&request.inserted, signature.args.len())?;

        let tr = Transaction::new(vec![Change::replace(request.insert_from, end, rewritten)])
            .with_selection(Selection::cursor(request.insert_from + cursor))
            .user_event("input.helper.args");
        let event = engine.dispatch(tr)?;
        self.after_edit(event, false)
    }
}

/// Build the extraction request for an inserted call like `${add()}`
fn args_request(inserted: &str, insert_from: usize, revision: u64) -> Option<ArgsRequest> {
    let expression = inserted
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(inserted)
        .to_string();
    let open = expression.rfind('(')?;
    let cursor = expression[..open].chars().count() + 1;
    Some(ArgsRequest {
        expression,
        cursor,
        revision,
        insert_from,
        inserted: inserted.to_string(),
    })
}

/// Fill the last `()` of `inserted` with `$1, $2, ...`. Returns the new text
/// and the char offset just past the closing parenthesis.
pub fn with_placeholders(inserted: &str, count: usize) -> Option<(String, usize)> {
    let open = inserted.rfind("()")?;
    let placeholders = (1..=count).map(|i| format!("${i}")).collect::<Vec<_>>().join(", ");
    let head = &inserted[..=open];
    let rewritten = format!("{head}{placeholders}{}", &inserted[open + 1..]);
    let cursor = head.chars().count() + placeholders.chars().count() + 1;
    Some((rewritten, cursor))
}
