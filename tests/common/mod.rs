//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chip_editor::chip::ChipEditor;
use chip_editor::codec::ModeConfig;
use chip_editor::commands::{Cmd, EditorId};
use chip_editor::config::EditorConfig;
use chip_editor::editable::Selection;
use chip_editor::rpc::{ArgumentExtractor, ExpressionTokenizer, FunctionSignature, RpcError, TokenQuery};
use chip_editor::tokens::{Token, TokenKind, TokenStream};

/// Settings with no debounce delay
pub fn test_settings() -> EditorConfig {
    EditorConfig {
        token_debounce_ms: 0,
        ..EditorConfig::default()
    }
}

/// `${...}` spans in `value` as tokens, in char offsets. Calls (containing
/// `(`) are functions, everything else a variable.
pub fn interpolation_tokens(value: &str) -> Vec<Token> {
    let chars: Vec<char> = value.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i + 1 < chars.len() {
        if chars[i] == '$' && chars[i + 1] == '{' {
            if let Some(close) = chars[i..].iter().position(|c| *c == '}') {
                let inner: String = chars[i + 2..i + close].iter().collect();
                let kind = if inner.contains('(') {
                    TokenKind::Function
                } else {
                    TokenKind::Variable
                };
                tokens.push(Token::new(kind, i, close + 1));
                i += close + 1;
                continue;
            }
        }
        i += 1;
    }
    tokens
}

/// Tokenizer that reports `${...}` spans and records every query
#[derive(Debug, Default)]
pub struct FakeTokenizer {
    pub queries: Mutex<Vec<TokenQuery>>,
}

impl FakeTokenizer {
    pub fn calls(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn last_query(&self) -> Option<TokenQuery> {
        self.queries.lock().ok().and_then(|q| q.last().cloned())
    }
}

impl ExpressionTokenizer for FakeTokenizer {
    fn expression_tokens(&self, query: &TokenQuery) -> Result<Option<TokenStream>, RpcError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        let tokens = interpolation_tokens(&query.value);
        if tokens.is_empty() {
            return Ok(None);
        }
        Ok(Some(TokenStream::encode(&tokens, &query.value)))
    }
}

/// Tokenizer whose every call fails
#[derive(Debug, Default)]
pub struct FailingTokenizer {
    pub calls: AtomicUsize,
}

impl ExpressionTokenizer for FailingTokenizer {
    fn expression_tokens(&self, _query: &TokenQuery) -> Result<Option<TokenStream>, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RpcError::Transport("connection refused".to_string()))
    }
}

/// Extractor answering with a fixed argument list
#[derive(Debug)]
pub struct FakeExtractor {
    pub args: Vec<String>,
}

impl FakeExtractor {
    pub fn with_args(args: &[&str]) -> Self {
        Self {
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl ArgumentExtractor for FakeExtractor {
    fn extract_args(&self, expression: &str, _cursor: usize) -> Result<FunctionSignature, RpcError> {
        Ok(FunctionSignature {
            label: expression.to_string(),
            args: self.args.clone(),
            current_arg_index: 0,
            documentation: None,
        })
    }
}

/// A mounted chip editor and the commands its mount produced
pub fn mounted_editor(config: ModeConfig, value: &str) -> (ChipEditor, Option<Cmd>) {
    let mut editor = ChipEditor::new(EditorId(1), config, test_settings());
    let cmd = editor.mount(value);
    (editor, cmd)
}

/// A mounted editor whose mount-time token request was answered by `tokenizer`
pub fn settled_editor(config: ModeConfig, value: &str, tokenizer: &dyn ExpressionTokenizer) -> ChipEditor {
    let (mut editor, cmd) = mounted_editor(config, value);
    settle(&mut editor, cmd, tokenizer);
    editor
}

/// Flatten a command into its leaves
pub fn leaves(cmd: &Option<Cmd>) -> Vec<Cmd> {
    match cmd {
        Some(cmd) => cmd.flatten().into_iter().cloned().collect(),
        None => Vec::new(),
    }
}

pub fn emitted_values(cmd: &Option<Cmd>) -> Vec<String> {
    leaves(cmd)
        .into_iter()
        .filter_map(|c| match c {
            Cmd::EmitChange { value, .. } => Some(value),
            _ => None,
        })
        .collect()
}

pub fn fetch_count(cmd: &Option<Cmd>) -> usize {
    leaves(cmd)
        .iter()
        .filter(|c| matches!(c, Cmd::FetchTokens { .. }))
        .count()
}

/// Run token fetches and debounces synchronously until nothing is left.
/// Returns how many tokenizer calls were made.
pub fn settle(editor: &mut ChipEditor, cmd: Option<Cmd>, tokenizer: &dyn ExpressionTokenizer) -> usize {
    let mut pending: Vec<Cmd> = leaves(&cmd);
    let mut calls = 0;
    while let Some(cmd) = pending.pop() {
        let next = match cmd {
            Cmd::FetchTokens {
                meta,
                query,
                replacement,
                ..
            } => {
                calls += 1;
                let result = tokenizer.expression_tokens(&query);
                editor.handle_tokens(meta, replacement, result)
            }
            Cmd::DebouncedTokenRefresh { revision, .. } => editor.debounce_elapsed(revision),
            _ => None,
        };
        pending.extend(leaves(&next));
    }
    calls
}

/// Move the caret to the end of the document
pub fn caret_to_end(editor: &mut ChipEditor) {
    let len = editor.engine().map_or(0, |e| e.len_chars());
    let _ = editor.on_selection(Selection::cursor(len));
}
