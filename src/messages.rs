//! Message types for the Elm-style architecture
//!
//! Results of background work flow back through these message types.

use crate::commands::{ArgsRequest, EditorId};
use crate::rpc::{FunctionSignature, RpcError};
use crate::tokens::{RequestMeta, TokenStream};

/// Messages sent from runtime workers back into `update`
#[derive(Debug)]
pub enum Msg {
    /// The debounce window for a token refresh closed
    DebounceElapsed { editor: EditorId, revision: u64 },
    /// A token request settled
    TokensFetched {
        editor: EditorId,
        meta: RequestMeta,
        replacement: Option<String>,
        result: Result<Option<TokenStream>, RpcError>,
    },
    /// An argument extraction settled
    ArgsExtracted {
        editor: EditorId,
        request: ArgsRequest,
        result: Result<FunctionSignature, RpcError>,
    },
    /// A preview token request settled
    PreviewTokensFetched {
        editor: EditorId,
        request_id: u64,
        result: Result<Option<TokenStream>, RpcError>,
    },
}

impl Msg {
    /// The editor this message is addressed to
    pub fn editor(&self) -> EditorId {
        match self {
            Msg::DebounceElapsed { editor, .. }
            | Msg::TokensFetched { editor, .. }
            | Msg::ArgsExtracted { editor, .. }
            | Msg::PreviewTokensFetched { editor, .. } => *editor,
        }
    }
}
