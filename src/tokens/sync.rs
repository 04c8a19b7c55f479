//! Tokenization sync: decides when the external token stream must be
//! refetched and whether a response may still touch the document.
//!
//! The controller never blocks an edit. A request records the document
//! revision it was issued at; when the response lands, the caller compares
//! that revision to the live one. Token overlays from superseded requests are
//! harmless, but a document replacement is only applied when nothing changed
//! in between.

use std::collections::VecDeque;

/// Emitted values remembered for echo detection
const RECENT_EMITS: usize = 8;

/// Why a refresh became owed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Mount,
    Edit,
    FocusOut,
    ExternalUpdate,
    TransformChanged,
}

/// Identity of an issued request, carried back with its response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMeta {
    pub id: u64,
    /// Document revision at issue time
    pub revision: u64,
    /// The request accompanies a host-driven value replacement
    pub external_update: bool,
}

/// What to do with a landed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// An equal-or-newer response was already applied
    Stale,
    /// Store the tokens; replace the document only if `replace_document`
    Apply { replace_document: bool },
}

#[derive(Debug, Clone, Default)]
pub struct TokenSync {
    owed: Option<RefreshReason>,
    in_flight: Option<RequestMeta>,
    next_id: u64,
    last_applied: u64,
    recent_emits: VecDeque<String>,
}

impl TokenSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_owed(&mut self, reason: RefreshReason) {
        if self.owed.is_none() {
            tracing::trace!(?reason, "token refresh owed");
        }
        // An external update must survive until its request lands
        if self.owed != Some(RefreshReason::ExternalUpdate) {
            self.owed = Some(reason);
        }
    }

    pub fn is_owed(&self) -> bool {
        self.owed.is_some()
    }

    pub fn owed_reason(&self) -> Option<RefreshReason> {
        self.owed
    }

    pub fn in_flight(&self) -> Option<RequestMeta> {
        self.in_flight
    }

    /// Re-render check: nothing owed and the document already shows the
    /// host's value means there is nothing to fetch.
    pub fn needs_fetch(&self, document: &str, expected_display: &str) -> bool {
        self.owed.is_some() || document != expected_display
    }

    /// Issue a request for `revision`, or `None` if an identical one is
    /// already in flight.
    pub fn begin(&mut self, revision: u64, external_update: bool) -> Option<RequestMeta> {
        if let Some(pending) = self.in_flight {
            if pending.revision == revision && (pending.external_update || !external_update) {
                tracing::debug!(revision, "token fetch skipped: request already in flight");
                return None;
            }
        }
        self.next_id += 1;
        let meta = RequestMeta {
            id: self.next_id,
            revision,
            external_update,
        };
        tracing::debug!(id = meta.id, revision, external_update, "token fetch issued");
        self.in_flight = Some(meta);
        Some(meta)
    }

    /// Settle a response (success or failure) against the live revision
    pub fn resolve(&mut self, meta: RequestMeta, current_revision: u64) -> Resolution {
        if self.in_flight.map(|p| p.id) == Some(meta.id) {
            self.in_flight = None;
        }
        if meta.id <= self.last_applied {
            tracing::debug!(id = meta.id, last = self.last_applied, "stale token response ignored");
            return Resolution::Stale;
        }
        self.last_applied = meta.id;

        let unchanged = meta.revision == current_revision;
        if unchanged && self.in_flight.is_none() {
            self.owed = None;
        }
        Resolution::Apply {
            replace_document: meta.external_update && unchanged,
        }
    }

    /// A failed request settles the in-flight slot but leaves the refresh owed
    pub fn fail(&mut self, meta: RequestMeta) {
        if self.in_flight.map(|p| p.id) == Some(meta.id) {
            self.in_flight = None;
        }
    }

    /// Remember a value sent upward so its echo is not mistaken for an
    /// external update
    pub fn record_emit(&mut self, value: &str) {
        if self.recent_emits.len() == RECENT_EMITS {
            self.recent_emits.pop_front();
        }
        self.recent_emits.push_back(value.to_string());
    }

    /// True if `value` is one of our own emissions coming back. Older
    /// emissions up to the match are forgotten.
    pub fn take_echo(&mut self, value: &str) -> bool {
        match self.recent_emits.iter().rposition(|v| v == value) {
            Some(index) => {
                self.recent_emits.drain(..=index);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            next_id: self.next_id,
            last_applied: self.last_applied,
            ..Self::default()
        };
    }
}
