use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::commands::{Cmd, EditorId};
use crate::config::EditorConfig;
use crate::keymap::{load_default_keymap, Keymap, Keystroke, Modifiers};
use crate::messages::Msg;
use crate::modes::{ExpandedEditor, KeyOutcome, ModeProps, ModeView, PointerTarget};
use crate::overlay::Point;
use crate::rpc::{ArgumentExtractor, ExpressionTokenizer};

/// A value reported to the host form (`onChange(value, cursor)`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    pub editor: EditorId,
    pub value: String,
    pub cursor: usize,
}

struct Mounted {
    view: ModeView,
    props: ModeProps,
}

/// Expanded shell and the inline editor it was opened from
struct Expanded {
    source: EditorId,
    shell: ExpandedEditor,
}

pub struct Runtime {
    settings: EditorConfig,
    keymap: Keymap,
    editors: BTreeMap<EditorId, Mounted>,
    expanded: Option<Expanded>,
    tokenizer: Option<Arc<dyn ExpressionTokenizer>>,
    extractor: Option<Arc<dyn ArgumentExtractor>>,
    /// Editors with an outside-pointer listener; at most one entry each
    listeners: HashSet<EditorId>,
    changes: Vec<ValueChange>,
    next_id: u64,
    /// Worker results sent or still being computed, not yet received
    pending: usize,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
}

impl Runtime {
    pub fn new(settings: EditorConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            settings,
            keymap: Keymap::with_bindings(load_default_keymap()),
            editors: BTreeMap::new(),
            expanded: None,
            tokenizer: None,
            extractor: None,
            listeners: HashSet::new(),
            changes: Vec::new(),
            next_id: 0,
            pending: 0,
            msg_tx,
            msg_rx,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn ExpressionTokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ArgumentExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn settings(&self) -> &EditorConfig {
        &self.settings
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    // ------------------------------------------------------------------------
    // Editors
    // ------------------------------------------------------------------------

    fn allocate_id(&mut self) -> EditorId {
        self.next_id += 1;
        EditorId(self.next_id)
    }

    /// Without an extractor the argument-placeholder feature is off
    fn effective_props(&self, props: &ModeProps) -> ModeProps {
        let mut props = props.clone();
        props.extractor_available &= self.extractor.is_some();
        props
    }

    /// Build and mount a view for a field
    pub fn open(&mut self, props: ModeProps) -> EditorId {
        let id = self.allocate_id();
        let props = self.effective_props(&props);
        let mut view = ModeView::build(id, &props, &self.settings);
        let cmd = view.mount(&props.value);
        self.editors.insert(id, Mounted { view, props });
        tracing::info!(editor = id.0, "editor opened");
        self.run(cmd);
        id
    }

    /// Unmount and forget an editor. Results still in flight for it are
    /// dropped when they land.
    pub fn close(&mut self, id: EditorId) {
        if self.expanded.as_ref().is_some_and(|e| e.source == id) {
            self.close_expanded();
        }
        let Some(mut mounted) = self.editors.remove(&id) else {
            return;
        };
        let cmd = mounted.view.unmount();
        self.run(cmd);
        self.listeners.remove(&id);
        tracing::info!(editor = id.0, "editor closed");
    }

    pub fn view(&self, id: EditorId) -> Option<&ModeView> {
        if let Some(mounted) = self.editors.get(&id) {
            return Some(&mounted.view);
        }
        self.expanded
            .as_ref()
            .map(|e| e.shell.view())
            .filter(|view| view.id() == id)
    }

    fn view_mut(&mut self, id: EditorId) -> Option<&mut ModeView> {
        if let Some(mounted) = self.editors.get_mut(&id) {
            return Some(&mut mounted.view);
        }
        self.expanded
            .as_mut()
            .map(|e| e.shell.view_mut())
            .filter(|view| view.id() == id)
    }

    /// The host re-rendered an editor with new props
    pub fn set_props(&mut self, id: EditorId, props: ModeProps) {
        let props = self.effective_props(&props);
        let settings = &self.settings;
        let Some(mounted) = self.editors.get_mut(&id) else {
            tracing::debug!(editor = id.0, "props for unknown editor ignored");
            return;
        };
        let cmd = mounted.view.set_props(&props, settings);
        mounted.props = props;
        self.run(cmd);
    }

    /// Run an operation against one view and execute what it returns
    pub fn apply(&mut self, id: EditorId, op: impl FnOnce(&mut ModeView) -> Option<Cmd>) -> bool {
        let Some(view) = self.view_mut(id) else {
            return false;
        };
        let cmd = op(view);
        self.run(cmd);
        true
    }

    pub fn type_text(&mut self, id: EditorId, text: &str) -> bool {
        self.apply(id, |view| view.type_text(text))
    }

    /// A key event from the host. `name` is the key name (`"b"`, `"Enter"`).
    /// Returns `false` when nothing claimed it.
    pub fn key_event(&mut self, id: EditorId, name: &str, mods: Modifiers) -> bool {
        let Some(stroke) = Keystroke::from_event(name, mods) else {
            return false;
        };
        let keymap = &self.keymap;
        let view = match self.editors.get_mut(&id) {
            Some(mounted) => &mut mounted.view,
            None => match self.expanded.as_mut() {
                Some(e) if e.shell.view().id() == id => e.shell.view_mut(),
                _ => return false,
            },
        };
        match view.handle_key(stroke, keymap) {
            KeyOutcome::Handled(cmd) => {
                self.run(cmd);
                true
            }
            KeyOutcome::RequestExpand => self.open_expanded(id).is_some(),
            KeyOutcome::Unhandled => false,
        }
    }

    /// A pointer-down anywhere in the host document. Only editors with a
    /// listener see it.
    pub fn pointer_down(&mut self, p: Point) {
        let mut listening: Vec<EditorId> = self.listeners.iter().copied().collect();
        listening.sort();
        for id in listening {
            self.apply(id, |view| view.chip_mut().on_pointer_down(p));
        }
    }

    // ------------------------------------------------------------------------
    // Expanded editor
    // ------------------------------------------------------------------------

    /// Open the modal shell over an inline editor, showing its current value
    pub fn open_expanded(&mut self, source: EditorId) -> Option<EditorId> {
        if self.expanded.is_some() {
            tracing::debug!(editor = source.0, "expanded editor already open");
            return None;
        }
        let mounted = self.editors.get(&source)?;
        let mut props = mounted.props.clone();
        props.value = mounted.view.chip().value().to_string();
        props.in_expanded_mode = true;
        props.mode = Some(mounted.view.mode());

        let id = self.allocate_id();
        let mut view = ModeView::build(id, &props, &self.settings);
        let cmd = view.mount(&props.value);
        self.expanded = Some(Expanded {
            source,
            shell: ExpandedEditor::open(view),
        });
        self.run(cmd);
        Some(id)
    }

    pub fn expanded(&self) -> Option<&ExpandedEditor> {
        self.expanded.as_ref().map(|e| &e.shell)
    }

    pub fn close_expanded(&mut self) {
        let Some(expanded) = self.expanded.take() else {
            return;
        };
        let id = expanded.shell.view().id();
        let cmd = expanded.shell.close();
        self.run(cmd);
        self.listeners.remove(&id);
    }

    pub fn expanded_mousedown(&mut self, target: PointerTarget) {
        if let Some(expanded) = self.expanded.as_mut() {
            expanded.shell.on_mousedown(target);
        }
    }

    pub fn expanded_click(&mut self, target: PointerTarget) {
        let close = self
            .expanded
            .as_mut()
            .is_some_and(|e| e.shell.on_click(target));
        if close {
            self.close_expanded();
        }
    }

    pub fn expanded_escape(&mut self) {
        let Some(expanded) = self.expanded.as_mut() else {
            return;
        };
        let (close, cmd) = expanded.shell.on_escape();
        self.run(cmd);
        if close {
            self.close_expanded();
        }
    }

    // ------------------------------------------------------------------------
    // Host-facing state
    // ------------------------------------------------------------------------

    /// Value changes since the last call, oldest first
    pub fn take_changes(&mut self) -> Vec<ValueChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn has_listener(&self, id: EditorId) -> bool {
        self.listeners.contains(&id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ------------------------------------------------------------------------
    // Commands and messages
    // ------------------------------------------------------------------------

    fn run(&mut self, cmd: Option<Cmd>) {
        if let Some(cmd) = cmd {
            self.process_cmd(cmd);
        }
    }

    /// Changes from the expanded shell belong to the field it was opened for
    fn change_target(&self, editor: EditorId) -> EditorId {
        match &self.expanded {
            Some(e) if e.shell.view().id() == editor => e.source,
            _ => editor,
        }
    }

    fn spawn(&mut self, job: impl FnOnce() -> Msg + Send + 'static) {
        let tx = self.msg_tx.clone();
        self.pending += 1;
        std::thread::spawn(move || {
            // The receiver only goes away with the runtime
            let _ = tx.send(job());
        });
    }

    /// A worker result came off the channel
    fn receive(&mut self, msg: Msg) {
        self.pending = self.pending.saturating_sub(1);
        self.update(msg);
    }

    pub fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::EmitChange {
                editor,
                value,
                cursor,
            } => {
                let editor = self.change_target(editor);
                tracing::trace!(editor = editor.0, %value, cursor, "value changed");
                self.changes.push(ValueChange {
                    editor,
                    value,
                    cursor,
                });
            }
            Cmd::DebouncedTokenRefresh {
                editor,
                revision,
                delay_ms,
            } => {
                self.spawn(move || {
                    std::thread::sleep(Duration::from_millis(delay_ms));
                    Msg::DebounceElapsed { editor, revision }
                });
            }
            Cmd::FetchTokens {
                editor,
                meta,
                query,
                replacement,
            } => {
                let tokenizer = self.tokenizer.clone();
                tracing::debug!(editor = editor.0, id = meta.id, "fetching tokens");
                self.spawn(move || {
                    let result = match tokenizer {
                        Some(tokenizer) => tokenizer.expression_tokens(&query),
                        None => Ok(None),
                    };
                    Msg::TokensFetched {
                        editor,
                        meta,
                        replacement,
                        result,
                    }
                });
            }
            Cmd::ExtractArgs { editor, request } => {
                let Some(extractor) = self.extractor.clone() else {
                    tracing::debug!(editor = editor.0, "no argument extractor, skipping");
                    return;
                };
                self.spawn(move || {
                    let result = extractor.extract_args(&request.expression, request.cursor);
                    Msg::ArgsExtracted {
                        editor,
                        request,
                        result,
                    }
                });
            }
            Cmd::FetchPreviewTokens {
                editor,
                request_id,
                query,
            } => {
                let tokenizer = self.tokenizer.clone();
                self.spawn(move || {
                    let result = match tokenizer {
                        Some(tokenizer) => tokenizer.expression_tokens(&query),
                        None => Ok(None),
                    };
                    Msg::PreviewTokensFetched {
                        editor,
                        request_id,
                        result,
                    }
                });
            }
            Cmd::AttachDismissListener { editor } => {
                if !self.listeners.insert(editor) {
                    tracing::warn!(editor = editor.0, "dismiss listener already attached");
                }
            }
            Cmd::DetachDismissListener { editor } => {
                self.listeners.remove(&editor);
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
        }
    }

    /// Route one worker result to its view
    pub fn update(&mut self, msg: Msg) {
        let id = msg.editor();
        let cmd = match self.view_mut(id) {
            Some(view) => view.update(msg),
            None => {
                tracing::debug!(editor = id.0, "result for a closed editor dropped");
                None
            }
        };
        self.run(cmd);
    }

    /// Drain results that already arrived. Returns how many were handled.
    pub fn process_async_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.receive(msg);
            handled += 1;
        }
        handled
    }

    /// Block until no work is in flight and every result has been handled,
    /// or `timeout` passes. Returns `true` when idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_async_messages();
            if self.pending == 0 {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.msg_rx.recv_timeout(deadline - now) {
                Ok(msg) => self.receive(msg),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("editors", &self.editors.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
