//! Collaborator interfaces consumed by the editor core.
//!
//! Both services live out of process in a real host. They are called from
//! runtime worker threads, so implementations block and must be `Send + Sync`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tokens::TokenStream;

/// Failure of an out-of-process call. Always absorbed by the core.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The call never reached the service.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response did not decode.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Input of a token request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuery {
    /// Deserialized (wrapper included) value
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
}

/// Signature of the function call under the cursor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    pub label: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub current_arg_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// External expression tokenizer. `Ok(None)` means "no tokens".
pub trait ExpressionTokenizer: Send + Sync {
    fn expression_tokens(&self, query: &TokenQuery) -> Result<Option<TokenStream>, RpcError>;
}

/// Optional function-argument extraction service
pub trait ArgumentExtractor: Send + Sync {
    fn extract_args(&self, expression: &str, cursor: usize) -> Result<FunctionSignature, RpcError>;
}

/// Decode a tokenizer JSON reply: a bare array, `null`, or `{"data": [...]}`
pub fn parse_token_response(json: &str) -> Result<Option<TokenStream>, RpcError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reply {
        Bare(Option<TokenStream>),
        Wrapped { data: Option<TokenStream> },
    }

    let reply: Reply = serde_json::from_str(json)?;
    let stream = match reply {
        Reply::Bare(stream) | Reply::Wrapped { data: stream } => stream,
    };
    Ok(stream.filter(|s| !s.is_empty()))
}

/// Decode an argument-extraction JSON reply
pub fn parse_signature(json: &str) -> Result<FunctionSignature, RpcError> {
    Ok(serde_json::from_str(json)?)
}
