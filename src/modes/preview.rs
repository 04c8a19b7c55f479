//! Read-only preview: chip markup reconstruction and markdown to HTML.

use pulldown_cmark::{html, Event, Parser, Tag};

use crate::template::markdown::parser_options;
use crate::tokens::{layout_chips, Token};

/// Re-insert `<chip>` markup around chip tokens of `text`.
///
/// Text outside chips is kept verbatim so markdown still parses; chip
/// contents are HTML-escaped.
pub fn reconstruct_chips(text: &str, tokens: &[Token]) -> String {
    let chips = layout_chips(text, tokens);
    if chips.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + chips.len() * 32);
    let mut pos = 0;
    for chip in chips {
        out.extend(&chars[pos..chip.range.start]);
        out.push_str(&format!(
            r#"<chip type="{}">{}</chip>"#,
            chip.kind.tag(),
            escape_html(&chip.text)
        ));
        pos = chip.range.end;
    }
    out.extend(&chars[pos..]);
    out
}

/// Markdown fragment to HTML, with `data-line` markers before block elements
/// for host scroll sync
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut out = String::new();
    html::push_html(&mut out, add_line_markers(parser, markdown));
    out
}

/// Plain text shown when no tokens could be fetched
pub fn render_fallback(text: &str) -> String {
    format!(r#"<pre class="preview-fallback">{}</pre>"#, escape_html(text))
}

fn add_line_markers<'a>(parser: Parser<'a>, markdown: &'a str) -> impl Iterator<Item = Event<'a>> {
    let mut current_line = 1;
    let mut last_offset = 0;

    parser.into_offset_iter().flat_map(move |(event, range)| {
        // Offsets are not monotonic inside nested constructs
        if range.start >= last_offset {
            current_line += markdown[last_offset..range.start].matches('\n').count();
            last_offset = range.start;
        }

        match &event {
            Event::Start(
                Tag::Heading { .. }
                | Tag::Paragraph
                | Tag::BlockQuote(_)
                | Tag::CodeBlock(_)
                | Tag::List(_)
                | Tag::Item,
            ) => vec![
                Event::Html(format!(r#"<span data-line="{}"></span>"#, current_line).into()),
                event,
            ],
            _ => vec![event],
        }
    })
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
