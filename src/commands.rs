//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.
//! The runtime executes them; results come back as [`crate::messages::Msg`].

use crate::rpc::TokenQuery;
use crate::tokens::RequestMeta;

/// Identifies one mounted editor within a runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EditorId(pub u64);

/// A pending function-argument extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgsRequest {
    /// Function call without any `${...}` wrapper, e.g. `add()`
    pub expression: String,
    /// Cursor offset within `expression` (between the parentheses)
    pub cursor: usize,
    /// Engine revision right after the insertion
    pub revision: u64,
    /// Char offset where the inserted text starts
    pub insert_from: usize,
    /// Text exactly as inserted, e.g. `${add()}`
    pub inserted: String,
}

// ============================================================================
// Commands
// ============================================================================

/// Commands returned by update functions
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Report a new value to the host form (`onChange(value, cursor)`)
    EmitChange {
        editor: EditorId,
        value: String,
        cursor: usize,
    },
    /// Sends `Msg::DebounceElapsed` after `delay_ms`
    DebouncedTokenRefresh {
        editor: EditorId,
        revision: u64,
        delay_ms: u64,
    },
    /// Ask the tokenizer for a token stream.
    /// Sends `Msg::TokensFetched` when done
    FetchTokens {
        editor: EditorId,
        meta: RequestMeta,
        query: TokenQuery,
        /// Displayed text to install if the request was an external update
        replacement: Option<String>,
    },
    /// Ask the argument extractor for a call signature.
    /// Sends `Msg::ArgsExtracted` when done
    ExtractArgs { editor: EditorId, request: ArgsRequest },
    /// Tokenize a template value for preview rendering.
    /// Sends `Msg::PreviewTokensFetched` when done
    FetchPreviewTokens {
        editor: EditorId,
        request_id: u64,
        query: TokenQuery,
    },
    /// Start routing outside pointer-downs to this editor
    AttachDismissListener { editor: EditorId },
    /// Stop routing outside pointer-downs to this editor
    DetachDismissListener { editor: EditorId },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Combine optional commands, flattening nested batches and dropping `None`s
    pub fn batch(cmds: impl IntoIterator<Item = Option<Cmd>>) -> Option<Cmd> {
        let mut out = Vec::new();
        for cmd in cmds.into_iter().flatten() {
            match cmd {
                Cmd::None => {}
                Cmd::Batch(inner) => out.extend(inner.into_iter().filter(|c| *c != Cmd::None)),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => None,
            1 => out.pop(),
            _ => Some(Cmd::Batch(out)),
        }
    }

    /// Whether this command (or any batched one) starts background work
    pub fn is_async(&self) -> bool {
        match self {
            Cmd::DebouncedTokenRefresh { .. }
            | Cmd::FetchTokens { .. }
            | Cmd::ExtractArgs { .. }
            | Cmd::FetchPreviewTokens { .. } => true,
            Cmd::Batch(cmds) => cmds.iter().any(Cmd::is_async),
            _ => false,
        }
    }

    /// Iterate this command and everything it batches, depth first
    pub fn flatten(&self) -> Vec<&Cmd> {
        match self {
            Cmd::Batch(cmds) => cmds.iter().flat_map(Cmd::flatten).collect(),
            other => vec![other],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(value: &str) -> Cmd {
        Cmd::EmitChange {
            editor: EditorId(1),
            value: value.to_string(),
            cursor: 0,
        }
    }

    #[test]
    fn test_batch_flattens_and_drops_none() {
        let cmd = Cmd::batch([
            Some(emit("a")),
            None,
            Some(Cmd::None),
            Some(Cmd::Batch(vec![emit("b"), Cmd::None])),
        ]);
        match cmd {
            Some(Cmd::Batch(cmds)) => assert_eq!(cmds, vec![emit("a"), emit("b")]),
            other => panic!("Expected batch, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_single_unwraps() {
        assert_eq!(Cmd::batch([Some(emit("a")), None]), Some(emit("a")));
        assert_eq!(Cmd::batch([None, None]), None);
    }

    #[test]
    fn test_is_async() {
        assert!(!emit("a").is_async());
        let refresh = Cmd::DebouncedTokenRefresh {
            editor: EditorId(1),
            revision: 1,
            delay_ms: 10,
        };
        assert!(Cmd::Batch(vec![emit("a"), refresh]).is_async());
    }
}
