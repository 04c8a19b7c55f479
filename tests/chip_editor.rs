//! Chip editor tests - value sync, token refresh, helper pane and insertion

mod common;

use chip_editor::chip::{CompletionItem, CompletionKind, DismissTargets, HelperOptions};
use chip_editor::codec::ModeConfig;
use chip_editor::commands::Cmd;
use chip_editor::editable::Selection;
use chip_editor::overlay::{FloatingAction, Point, Rect};
use chip_editor::rpc::{ExpressionTokenizer, FunctionSignature, RpcError, TokenQuery};
use chip_editor::tokens::{Token, TokenKind, TokenStream};
use common::{
    caret_to_end, emitted_values, fetch_count, leaves, mounted_editor, settle, settled_editor, FailingTokenizer,
    FakeTokenizer,
};

fn attach_count(cmd: &Option<Cmd>) -> usize {
    leaves(cmd)
        .iter()
        .filter(|c| matches!(c, Cmd::AttachDismissListener { .. }))
        .count()
}

fn detach_count(cmd: &Option<Cmd>) -> usize {
    leaves(cmd)
        .iter()
        .filter(|c| matches!(c, Cmd::DetachDismissListener { .. }))
        .count()
}

fn tokens_for(tokenizer: &FakeTokenizer, value: &str) -> Result<Option<TokenStream>, RpcError> {
    tokenizer.expression_tokens(&TokenQuery {
        value: value.to_string(),
        file_name: None,
        start_line: None,
    })
}

fn first_fetch(cmd: &Option<Cmd>) -> Option<(TokenQuery, Option<String>)> {
    leaves(cmd).into_iter().find_map(|c| match c {
        Cmd::FetchTokens {
            query, replacement, ..
        } => Some((query, replacement)),
        _ => None,
    })
}

// ========================================================================
// Mount and token refresh
// ========================================================================

#[test]
fn test_mount_requests_tokens_for_deserialized_value() {
    let (editor, cmd) = mounted_editor(ModeConfig::raw_template(), "`Hello ${name}`");

    assert_eq!(editor.text().as_deref(), Some("Hello ${name}"));
    let (query, replacement) = first_fetch(&cmd).expect("mount should fetch tokens");
    assert_eq!(query.value, "`Hello ${name}`");
    assert_eq!(replacement, None);
}

#[test]
fn test_token_offsets_shift_by_prefix_length() {
    let tokenizer = FakeTokenizer::default();
    let editor = settled_editor(ModeConfig::string_template(), "string `Hi ${old} there`", &tokenizer);

    // Raw offset 11 in the wrapped value, prefix `string \`` is 8 chars
    let tokens = editor.engine().unwrap().tokens();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].start, 3);
    assert_eq!(tokens[0].length, 6);

    let chips = editor.chips();
    assert_eq!(chips.len(), 1);
    assert_eq!(chips[0].text, "${old}");
}

#[test]
fn test_multiline_template_chips_skip_prefix_below_first_line() {
    let tokenizer = FakeTokenizer::default();
    let editor = settled_editor(ModeConfig::string_template(), "string `intro\nhi ${name}`", &tokenizer);

    assert_eq!(editor.text().as_deref(), Some("intro\nhi ${name}"));
    let chips = editor.chips();
    assert_eq!(chips.len(), 1);
    assert_eq!(chips[0].text, "${name}");
    assert_eq!(chips[0].range, 9..16);
}

#[test]
fn test_rerender_with_same_value_does_not_refetch() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::raw_template(), "`Hello ${name}`", &tokenizer);
    assert_eq!(tokenizer.calls(), 1);
    assert!(!editor.sync().is_owed());

    let cmd = editor.set_value("`Hello ${name}`");
    assert_eq!(cmd, None);
    assert_eq!(tokenizer.calls(), 1);
}

#[test]
fn test_edit_then_blur_fetches_once() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::raw_template(), "`Hello ${name}`", &tokenizer);
    caret_to_end(&mut editor);

    let edit = editor.type_text("!");
    assert_eq!(emitted_values(&edit), vec!["`Hello ${name}!`".to_string()]);
    let revision = leaves(&edit)
        .into_iter()
        .find_map(|c| match c {
            Cmd::DebouncedTokenRefresh { revision, .. } => Some(revision),
            _ => None,
        })
        .expect("edit should schedule a refresh");

    // The host echoes the emitted value back
    assert_eq!(editor.set_value("`Hello ${name}!`"), None);

    let blur = editor.on_blur(false);
    assert_eq!(fetch_count(&blur), 1);
    // The debounce lands while the blur request is in flight
    assert_eq!(editor.debounce_elapsed(revision), None);

    let calls = settle(&mut editor, blur, &tokenizer);
    assert_eq!(calls, 1);
    assert_eq!(tokenizer.calls(), 2);
    assert_eq!(tokenizer.last_query().unwrap().value, "`Hello ${name}!`");
}

#[test]
fn test_blur_into_pane_is_not_focus_out() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::raw_template(), "`x`", &tokenizer);
    editor.on_focus();

    assert_eq!(editor.on_blur(true), None);
    assert!(editor.is_focused());
}

#[test]
fn test_stale_debounce_is_skipped() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::plain(), "a", &tokenizer);
    caret_to_end(&mut editor);

    let first = editor.type_text("b");
    let stale_revision = leaves(&first)
        .into_iter()
        .find_map(|c| match c {
            Cmd::DebouncedTokenRefresh { revision, .. } => Some(revision),
            _ => None,
        })
        .unwrap();
    editor.type_text("c");

    assert_eq!(editor.debounce_elapsed(stale_revision), None);
}

#[test]
fn test_response_racing_an_edit_keeps_refresh_owed() {
    let tokenizer = FakeTokenizer::default();
    let (mut editor, mount) = mounted_editor(ModeConfig::raw_template(), "`${a}`");
    let meta = leaves(&mount)
        .into_iter()
        .find_map(|c| match c {
            Cmd::FetchTokens { meta, .. } => Some(meta),
            _ => None,
        })
        .unwrap();

    caret_to_end(&mut editor);
    editor.type_text("b");
    let result = tokens_for(&tokenizer, "`${a}`");
    assert_eq!(editor.handle_tokens(meta, None, result), None);

    // The document is never driven by a non-external response
    assert_eq!(editor.text().as_deref(), Some("${a}b"));
    assert!(editor.sync().is_owed());

    let revision = editor.engine().unwrap().revision();
    assert_eq!(fetch_count(&editor.debounce_elapsed(revision)), 1);
}

#[test]
fn test_external_update_replaces_document_without_emitting() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::raw_template(), "`Hello`", &tokenizer);

    let cmd = editor.set_value("`Bye ${x}`");
    let (query, replacement) = first_fetch(&cmd).expect("external update fetches");
    assert_eq!(query.value, "`Bye ${x}`");
    assert_eq!(replacement.as_deref(), Some("Bye ${x}"));

    settle(&mut editor, cmd, &tokenizer);
    assert_eq!(editor.text().as_deref(), Some("Bye ${x}"));
    assert_eq!(editor.engine().unwrap().tokens(), &[Token::new(TokenKind::Variable, 4, 4)]);
    // Undo history does not contain the host's replacement
    assert!(!editor.engine().unwrap().can_undo());
}

#[test]
fn test_second_external_update_during_fetch_wins() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::plain(), "a", &tokenizer);

    let first = editor.set_value("b");
    assert_eq!(fetch_count(&first), 1);
    // The document still shows "a" while the first replacement is in flight
    let second = editor.set_value("c");

    settle(&mut editor, first, &tokenizer);
    settle(&mut editor, second, &tokenizer);
    assert_eq!(editor.text().as_deref(), Some("c"));
    assert!(!editor.sync().is_owed());
    assert!(editor.sync().in_flight().is_none());
}

#[test]
fn test_external_update_applies_when_tokenizer_fails() {
    let tokenizer = FailingTokenizer::default();
    let (mut editor, mount) = mounted_editor(ModeConfig::raw_template(), "`old`");
    settle(&mut editor, mount, &tokenizer);

    let cmd = editor.set_value("`new`");
    settle(&mut editor, cmd, &tokenizer);
    assert_eq!(editor.text().as_deref(), Some("new"));
}

#[test]
fn test_tokenizer_failure_keeps_previous_tokens() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::raw_template(), "`Hello ${name}`", &tokenizer);
    assert_eq!(editor.engine().unwrap().tokens().len(), 1);

    let blur = editor.on_blur(false);
    settle(&mut editor, blur, &FailingTokenizer::default());

    assert_eq!(editor.engine().unwrap().tokens().len(), 1);
    assert!(editor.sync().is_owed());
}

#[test]
fn test_transform_identity_change_owes_refresh() {
    use std::sync::Arc;

    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::plain(), "a", &tokenizer);
    let upper: chip_editor::chip::Transform = Arc::new(|s: &str| s.to_uppercase());

    let cmd = editor.set_transforms(Some(upper.clone()), None);
    assert_eq!(fetch_count(&cmd), 1);
    settle(&mut editor, cmd, &tokenizer);
    assert_eq!(editor.text().as_deref(), Some("A"));

    // Same identity: nothing to do
    assert_eq!(editor.set_transforms(Some(upper), None), None);
}

// ========================================================================
// Lifecycle
// ========================================================================

#[test]
fn test_results_after_unmount_are_ignored() {
    let tokenizer = FakeTokenizer::default();
    let (mut editor, mount) = mounted_editor(ModeConfig::raw_template(), "`${a}`");
    let meta = leaves(&mount)
        .into_iter()
        .find_map(|c| match c {
            Cmd::FetchTokens { meta, .. } => Some(meta),
            _ => None,
        })
        .unwrap();

    editor.unmount();
    let result = tokens_for(&tokenizer, "`${a}`");
    assert_eq!(editor.handle_tokens(meta, Some("x".to_string()), result), None);
    assert_eq!(editor.text(), None);
    assert_eq!(editor.type_text("x"), None);
    assert_eq!(editor.on_focus(), None);
}

#[test]
fn test_remount_starts_fresh() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::plain(), "a", &tokenizer);
    caret_to_end(&mut editor);
    editor.type_text("b");
    assert!(editor.engine().unwrap().can_undo());

    let cmd = editor.mount("fresh");
    assert_eq!(editor.text().as_deref(), Some("fresh"));
    assert!(!editor.engine().unwrap().can_undo());
    assert_eq!(fetch_count(&cmd), 1);
}

// ========================================================================
// Compatibility
// ========================================================================

#[test]
fn test_numeric_rejects_non_digit_keystroke() {
    let (mut editor, _) = mounted_editor(ModeConfig::numeric(), "12");
    caret_to_end(&mut editor);

    assert_eq!(editor.type_text("a"), None);
    assert_eq!(editor.text().as_deref(), Some("12"));

    let cmd = editor.type_text("3");
    assert_eq!(emitted_values(&cmd), vec!["123".to_string()]);
}

#[test]
fn test_incompatible_external_value_is_corrected() {
    let (mut editor, _) = mounted_editor(ModeConfig::numeric(), "12");

    let cmd = editor.set_value("12a");
    assert_eq!(emitted_values(&cmd), vec!["12".to_string()]);
    assert_eq!(editor.text().as_deref(), Some("12"));
}

#[test]
fn test_incompatible_value_on_mount_is_corrected() {
    let (editor, cmd) = mounted_editor(ModeConfig::numeric(), "abc");
    assert_eq!(emitted_values(&cmd), vec![String::new()]);
    assert_eq!(editor.text().as_deref(), Some(""));
}

// ========================================================================
// Helper pane
// ========================================================================

#[test]
fn test_pane_trigger_characters() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "");

    let focus = editor.on_focus();
    assert_eq!(attach_count(&focus), 1);
    assert!(editor.pane().is_open);

    let cmd = editor.type_text("a");
    assert_eq!(detach_count(&cmd), 1);
    assert!(!editor.pane().is_open);

    let cmd = editor.type_text("+");
    assert_eq!(attach_count(&cmd), 1);
    assert!(editor.pane().is_open);

    // Trailing space keeps the trigger as last non-space character
    let cmd = editor.type_text(" ");
    assert_eq!(attach_count(&cmd) + detach_count(&cmd), 0);
    assert!(editor.pane().is_open);

    editor.type_text("b");
    assert!(!editor.pane().is_open);

    editor.type_text(":");
    assert!(editor.pane().is_open);
}

#[test]
fn test_range_selection_opens_pane_once() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "hello");

    let cmd = editor.on_selection(Selection::new(0, 3));
    assert_eq!(attach_count(&cmd), 1);
    assert_eq!(editor.mailbox().peek(), Some(Selection::new(0, 3)));

    // Already open: the listener is not attached twice
    let cmd = editor.select_all();
    assert_eq!(attach_count(&cmd), 0);
    assert_eq!(editor.mailbox().peek(), Some(Selection::new(0, 5)));
}

#[test]
fn test_outside_pointer_and_escape_dismiss() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "hello");
    editor.set_layout(
        DismissTargets {
            editor: Rect::new(0.0, 0.0, 200.0, 30.0),
            ..DismissTargets::default()
        },
        1000.0,
    );

    editor.on_focus();
    assert_eq!(editor.on_pointer_down(Point::new(10.0, 10.0)), None);
    assert!(editor.pane().is_open);

    let cmd = editor.on_pointer_down(Point::new(900.0, 900.0));
    assert_eq!(detach_count(&cmd), 1);
    assert!(!editor.pane().is_open);

    editor.select_all();
    let cmd = editor.on_escape();
    assert_eq!(detach_count(&cmd), 1);
    assert_eq!(editor.on_escape(), None);
}

#[test]
fn test_manual_toggle_anchors_below_button() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "x");
    editor.set_layout(
        DismissTargets {
            editor: Rect::new(0.0, 0.0, 600.0, 40.0),
            ..DismissTargets::default()
        },
        500.0,
    );

    let cmd = editor.toggle_helper(Rect::new(450.0, 10.0, 20.0, 20.0), Rect::new(0.0, 0.0, 600.0, 40.0));
    assert_eq!(attach_count(&cmd), 1);
    let pane = editor.pane();
    assert_eq!(pane.top, 30.0);
    // Pane width 400 with an 8px margin stays inside a 500px viewport
    assert_eq!(pane.left, 92.0);

    let cmd = editor.toggle_helper(Rect::new(450.0, 10.0, 20.0, 20.0), Rect::new(0.0, 0.0, 600.0, 40.0));
    assert_eq!(detach_count(&cmd), 1);
}

#[test]
fn test_helper_unavailable_never_opens() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "");
    editor.set_helper_available(false);

    assert_eq!(editor.on_focus(), None);
    assert!(!editor.pane().is_open);
    assert_eq!(editor.pane_view(), None);
}

// ========================================================================
// Helper insertion
// ========================================================================

#[test]
fn test_function_completion_replaces_selection_verbatim() {
    let (mut editor, _) = mounted_editor(ModeConfig::string_template(), "TEXT_HERE");
    editor.select_all();

    let cmd = editor.insert_helper(
        "foo()",
        Some(CompletionKind::Function),
        HelperOptions {
            close_helper_pane: true,
            replace_full_text: false,
        },
    );

    assert_eq!(editor.text().as_deref(), Some("foo()"));
    assert_eq!(emitted_values(&cmd), vec!["string `foo()`".to_string()]);
    assert_eq!(detach_count(&cmd), 1);
    assert!(!leaves(&cmd).iter().any(|c| matches!(c, Cmd::ExtractArgs { .. })));
}

#[test]
fn test_variable_completion_replaces_token_under_cursor() {
    let tokenizer = FakeTokenizer::default();
    let mut editor = settled_editor(ModeConfig::string_template(), "string `Hi ${old} there`", &tokenizer);
    editor.on_selection(Selection::cursor(5));
    editor.on_focus();

    editor.insert_helper("new", Some(CompletionKind::Variable), HelperOptions::default());

    assert_eq!(editor.text().as_deref(), Some("Hi ${new} there"));
    assert_eq!(editor.engine().unwrap().selection(), Selection::cursor(9));
    // Pane stays open for a follow-up choice
    assert!(editor.pane().is_open);
}

#[test]
fn test_insertion_uses_saved_selection_not_live() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "abc");
    editor.on_selection(Selection::new(1, 2));
    // Focus moved to the pane and the engine collapsed its selection
    editor.dispatch(chip_editor::editable::Transaction::select(Selection::cursor(0)));

    editor.insert_helper("X", None, HelperOptions::default());
    assert_eq!(editor.text().as_deref(), Some("aXc"));
}

#[test]
fn test_replace_full_text() {
    let (mut editor, _) = mounted_editor(ModeConfig::raw_template(), "`one two`");
    editor.on_focus();

    let cmd = editor.insert_helper(
        "v",
        None,
        HelperOptions {
            close_helper_pane: false,
            replace_full_text: true,
        },
    );
    assert_eq!(editor.text().as_deref(), Some("${v}"));
    assert_eq!(emitted_values(&cmd), vec!["`${v}`".to_string()]);
}

#[test]
fn test_call_insertion_expands_argument_placeholders() {
    let (mut editor, _) = mounted_editor(ModeConfig::string_template(), "");
    editor.set_extractor_available(true);
    editor.on_focus();

    let cmd = editor.insert_helper("add()", Some(CompletionKind::Function), HelperOptions::default());
    let request = leaves(&cmd)
        .into_iter()
        .find_map(|c| match c {
            Cmd::ExtractArgs { request, .. } => Some(request),
            _ => None,
        })
        .expect("call insertion asks for arguments");
    assert_eq!(request.expression, "add()");
    assert_eq!(request.cursor, 4);

    let signature = FunctionSignature {
        label: "add(a, b)".to_string(),
        args: vec!["a".to_string(), "b".to_string()],
        ..FunctionSignature::default()
    };
    let cmd = editor.handle_args(request, Ok(signature));

    assert_eq!(editor.text().as_deref(), Some("add($1, $2)"));
    assert_eq!(editor.engine().unwrap().selection(), Selection::cursor(11));
    assert_eq!(emitted_values(&cmd), vec!["string `add($1, $2)`".to_string()]);
}

#[test]
fn test_wrapped_call_insertion_unwraps_for_extraction() {
    let (mut editor, _) = mounted_editor(ModeConfig::raw_template(), "");
    editor.set_extractor_available(true);
    editor.on_focus();

    let cmd = editor.insert_helper("sum()", None, HelperOptions::default());
    assert_eq!(editor.text().as_deref(), Some("${sum()}"));
    let request = leaves(&cmd)
        .into_iter()
        .find_map(|c| match c {
            Cmd::ExtractArgs { request, .. } => Some(request),
            _ => None,
        })
        .unwrap();
    assert_eq!(request.expression, "sum()");

    let signature = FunctionSignature {
        args: vec!["xs".to_string()],
        ..FunctionSignature::default()
    };
    editor.handle_args(request, Ok(signature));
    assert_eq!(editor.text().as_deref(), Some("${sum($1)}"));
}

#[test]
fn test_extraction_failure_keeps_plain_insertion() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "");
    editor.set_extractor_available(true);
    editor.on_focus();

    let cmd = editor.insert_helper("add()", Some(CompletionKind::Function), HelperOptions::default());
    let request = leaves(&cmd)
        .into_iter()
        .find_map(|c| match c {
            Cmd::ExtractArgs { request, .. } => Some(request),
            _ => None,
        })
        .unwrap();

    let cmd = editor.handle_args(request, Err(RpcError::Rejected("no such function".to_string())));
    assert_eq!(cmd, None);
    assert_eq!(editor.text().as_deref(), Some("add()"));
}

#[test]
fn test_placeholders_skipped_after_further_edits() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "");
    editor.set_extractor_available(true);
    editor.on_focus();

    let cmd = editor.insert_helper("add()", Some(CompletionKind::Function), HelperOptions::default());
    let request = leaves(&cmd)
        .into_iter()
        .find_map(|c| match c {
            Cmd::ExtractArgs { request, .. } => Some(request),
            _ => None,
        })
        .unwrap();
    editor.type_text(" + 1");

    let signature = FunctionSignature {
        args: vec!["a".to_string()],
        ..FunctionSignature::default()
    };
    assert_eq!(editor.handle_args(request, Ok(signature)), None);
    assert_eq!(editor.text().as_deref(), Some("add() + 1"));
}

#[test]
fn test_no_extractor_no_request() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "");
    editor.on_focus();

    let cmd = editor.insert_helper("add()", Some(CompletionKind::Function), HelperOptions::default());
    assert!(!leaves(&cmd).iter().any(|c| matches!(c, Cmd::ExtractArgs { .. })));
}

// ========================================================================
// Completions and floating actions
// ========================================================================

#[test]
fn test_completions_filter_by_word_before_cursor() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "pay");
    editor.set_completions(vec![
        CompletionItem::new("properties", "properties", CompletionKind::Variable),
        CompletionItem::new("payload", "payload", CompletionKind::Variable),
    ]);
    caret_to_end(&mut editor);
    let labels: Vec<&str> = editor
        .completions_for_cursor()
        .into_iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, vec!["payload"]);
}

#[test]
fn test_floating_actions_follow_helper_and_expanded_state() {
    let (mut editor, _) = mounted_editor(ModeConfig::plain(), "x");
    let actions = |editor: &chip_editor::ChipEditor, expanded: bool| -> Vec<FloatingAction> {
        editor.floating_actions(expanded).into_iter().map(|b| b.action).collect()
    };

    assert_eq!(
        actions(&editor, false),
        vec![FloatingAction::ToggleHelper, FloatingAction::Expand]
    );
    assert_eq!(
        actions(&editor, true),
        vec![FloatingAction::ToggleHelper, FloatingAction::Minimize]
    );

    editor.set_helper_available(false);
    assert_eq!(actions(&editor, false), vec![FloatingAction::Expand]);
}
