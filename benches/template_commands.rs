//! Benchmarks for template commands, markdown conversion and token streams
//!
//! Run with: cargo bench template_commands

use chip_editor::editable::{CodeEngine, EditConstraints, Selection};
use chip_editor::template::markdown;
use chip_editor::template::rich::RichEditor;
use chip_editor::template::{CodeCommands, ListKind, StructuredEditing};
use chip_editor::tokens::{Token, TokenKind, TokenStream};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn prompt_source(sections: usize) -> String {
    "## Step\n\nUse **${input}** and _${context}_.\n\n- first\n- second\n\n> note\n\n".repeat(sections)
}

fn plain_lines(n: usize) -> String {
    "list entry text\n".repeat(n)
}

// ============================================================================
// Code engine commands
// ============================================================================

#[divan::bench(args = [10, 100, 1000])]
fn toggle_bullet_list(n: usize) {
    let text = plain_lines(n);
    let mut engine = CodeEngine::new(&text, EditConstraints::multiline());
    engine.set_selection(Selection::new(0, engine.len_chars()));
    let mut commands = CodeCommands::new(Some(&mut engine));
    divan::black_box(commands.toggle_list(ListKind::Unordered));
}

#[divan::bench(args = [10, 100, 1000])]
fn toggle_ordered_list_twice(n: usize) {
    let text = plain_lines(n);
    let mut engine = CodeEngine::new(&text, EditConstraints::multiline());
    engine.set_selection(Selection::new(0, engine.len_chars()));
    let mut commands = CodeCommands::new(Some(&mut engine));
    commands.toggle_list(ListKind::Ordered);
    divan::black_box(commands.toggle_list(ListKind::Ordered));
}

#[divan::bench]
fn continue_list_at_end() {
    let text = "- item\n".repeat(500) + "- last";
    let mut engine = CodeEngine::new(&text, EditConstraints::multiline());
    engine.set_selection(Selection::cursor(engine.len_chars()));
    let mut commands = CodeCommands::new(Some(&mut engine));
    divan::black_box(commands.continue_list());
}

// ============================================================================
// Markdown conversion
// ============================================================================

#[divan::bench(args = [1, 10, 100])]
fn markdown_parse(sections: usize) {
    let source = prompt_source(sections);
    divan::black_box(markdown::parse(divan::black_box(&source)));
}

#[divan::bench(args = [1, 10, 100])]
fn markdown_round_trip(sections: usize) {
    let doc = markdown::parse(&prompt_source(sections));
    divan::black_box(markdown::render(divan::black_box(&doc)));
}

#[divan::bench(args = [1, 10, 100])]
fn rich_type_and_serialize(sections: usize) {
    let mut editor = RichEditor::from_markdown(&prompt_source(sections));
    editor.insert_text("more");
    divan::black_box(editor.to_markdown());
}

// ============================================================================
// Token streams
// ============================================================================

#[divan::bench(args = [100, 1000])]
fn token_stream_decode(n: usize) {
    let text = "${value} + ${other}\n".repeat(n);
    let tokens: Vec<Token> = (0..n)
        .flat_map(|line| {
            let start = line * 20;
            [
                Token::new(TokenKind::Variable, start, 8),
                Token::new(TokenKind::Variable, start + 11, 8),
            ]
        })
        .collect();
    let stream = TokenStream::encode(&tokens, &text);
    divan::black_box(stream.decode(divan::black_box(&text)));
}
