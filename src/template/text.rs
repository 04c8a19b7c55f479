//! Markdown source transforms for the plain-text engine.
//!
//! Each command reads the document and selection and returns the
//! [`Transaction`] that performs it, or `None` when there is nothing to do.
//! Offsets are chars.

use std::sync::OnceLock;

use regex::Regex;
use ropey::Rope;

use super::ListKind;
use crate::editable::{Change, Selection, Transaction};

pub const LINK_TEXT_PLACEHOLDER: &str = "link text";
pub const LINK_URL_PLACEHOLDER: &str = "url";
pub const QUOTE_PREFIX: &str = "> ";

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn heading_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^(#{1,6})(?:\s+|$)")
}

fn link_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^\[([^\]]*)\]\(([^)\s]*)\)$")
}

fn link_tail_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^\]\([^)\s]*\)")
}

fn list_item_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^(\s*)(?:([-*]) \[([ xX])\] |([-*]) |(\d+)\. )")
}

fn chars(s: &str) -> usize {
    s.chars().count()
}

fn slice(doc: &Rope, from: usize, to: usize) -> String {
    let len = doc.len_chars();
    let from = from.min(len);
    doc.slice(from..to.clamp(from, len)).to_string()
}

/// A line without its line break
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub from: usize,
    pub to: usize,
    pub text: String,
}

impl LineSpan {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn line_span(doc: &Rope, line: usize) -> LineSpan {
    let line = line.min(doc.len_lines().saturating_sub(1));
    let from = doc.line_to_char(line);
    let text = doc
        .line(line)
        .to_string()
        .trim_end_matches(['\n', '\r'])
        .to_string();
    LineSpan {
        from,
        to: from + chars(&text),
        text,
    }
}

/// Lines touched by the selection. A range ending at the start of a line
/// does not include that line.
pub fn selected_lines(doc: &Rope, sel: Selection) -> Vec<LineSpan> {
    let len = doc.len_chars();
    let from = sel.from().min(len);
    let to = sel.to().min(len);
    let first = doc.char_to_line(from);
    let mut last = doc.char_to_line(to);
    if last > first && to == doc.line_to_char(last) {
        last -= 1;
    }
    (first..=last).map(|l| line_span(doc, l)).collect()
}

// ============================================================================
// Inline wrap
// ============================================================================

/// Wrap the selection in `prefix`/`suffix`, or unwrap it if the selection is
/// already wrapped or sits directly between the delimiters.
pub fn toggle_wrap(doc: &Rope, sel: Selection, prefix: &str, suffix: &str) -> Transaction {
    let (from, to) = (sel.from(), sel.to());
    let (p, s) = (chars(prefix), chars(suffix));
    let selected = slice(doc, from, to);

    if chars(&selected) >= p + s && selected.starts_with(prefix) && selected.ends_with(suffix) {
        let inner: String = selected.chars().skip(p).take(chars(&selected) - p - s).collect();
        let inner_len = chars(&inner);
        return Transaction::new(vec![Change::replace(from, to, inner)])
            .with_selection(Selection::new(from, from + inner_len))
            .user_event("format.unwrap");
    }

    let surrounded = from >= p
        && to + s <= doc.len_chars()
        && slice(doc, from - p, from) == prefix
        && slice(doc, to, to + s) == suffix;
    if surrounded {
        return Transaction::new(vec![Change::delete(from - p, from), Change::delete(to, to + s)])
            .with_selection(Selection::new(from - p, to - p))
            .user_event("format.unwrap");
    }

    Transaction::new(vec![Change::insert(from, prefix), Change::insert(to, suffix)])
        .with_selection(Selection::new(from + p, to + p))
        .user_event("format.wrap")
}

/// Whether the selection is wrapped by, or sits inside, the delimiters
pub fn is_wrapped(doc: &Rope, sel: Selection, prefix: &str, suffix: &str) -> bool {
    let (from, to) = (sel.from(), sel.to());
    let (p, s) = (chars(prefix), chars(suffix));
    let selected = slice(doc, from, to);
    (chars(&selected) >= p + s && selected.starts_with(prefix) && selected.ends_with(suffix))
        || (from >= p
            && to + s <= doc.len_chars()
            && slice(doc, from - p, from) == prefix
            && slice(doc, to, to + s) == suffix)
}

// ============================================================================
// Headings
// ============================================================================

/// Heading level of a line, if it has a `#` marker
pub fn heading_level(line: &str) -> Option<u8> {
    let caps = heading_re()?.captures(line)?;
    caps.get(1).map(|m| m.as_str().len() as u8)
}

/// Toggle a level-N heading on the cursor's line. Same level strips the
/// marker; any other level is replaced by exactly N `#`s.
pub fn toggle_heading(doc: &Rope, sel: Selection, level: u8) -> Option<Transaction> {
    if !(1..=6).contains(&level) {
        return None;
    }
    let line = line_span(doc, doc.char_to_line(sel.head.min(doc.len_chars())));
    let marker = format!("{} ", "#".repeat(level as usize));

    let change = match heading_re().and_then(|re| re.find(&line.text)) {
        Some(m) => {
            let end = line.from + chars(m.as_str());
            if m.as_str().trim_end().len() == level as usize {
                Change::delete(line.from, end)
            } else {
                Change::replace(line.from, end, marker)
            }
        }
        None => Change::insert(line.from, marker),
    };
    Some(Transaction::new(vec![change]).user_event("format.heading"))
}

// ============================================================================
// Links
// ============================================================================

/// Toggle `[text](url)` markup around the selection.
///
/// Wrapping selects the url span so it can be typed over.
pub fn toggle_link(doc: &Rope, sel: Selection) -> Option<Transaction> {
    let (from, to) = (sel.from(), sel.to());
    let selected = slice(doc, from, to);

    if let Some(caps) = link_re().and_then(|re| re.captures(&selected)) {
        let label = caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
        let label_len = chars(&label);
        return Some(
            Transaction::new(vec![Change::replace(from, to, label)])
                .with_selection(Selection::new(from, from + label_len))
                .user_event("format.unlink"),
        );
    }

    if from >= 1 && slice(doc, from - 1, from) == "[" {
        let rest = slice(doc, to, doc.len_chars());
        if let Some(m) = link_tail_re().and_then(|re| re.find(&rest)) {
            let tail = chars(m.as_str());
            return Some(
                Transaction::new(vec![Change::delete(from - 1, from), Change::delete(to, to + tail)])
                    .with_selection(Selection::new(from - 1, to - 1))
                    .user_event("format.unlink"),
            );
        }
    }

    let label = if selected.is_empty() {
        LINK_TEXT_PLACEHOLDER.to_string()
    } else {
        selected
    };
    let url_start = from + 1 + chars(&label) + 2;
    let url_end = url_start + chars(LINK_URL_PLACEHOLDER);
    let markup = format!("[{label}]({LINK_URL_PLACEHOLDER})");
    Some(
        Transaction::new(vec![Change::replace(from, to, markup)])
            .with_selection(Selection::new(url_start, url_end))
            .user_event("format.link"),
    )
}

// ============================================================================
// Blockquote
// ============================================================================

/// Quote or unquote the selected lines. Blank lines are never touched.
pub fn toggle_blockquote(doc: &Rope, sel: Selection) -> Option<Transaction> {
    let lines = selected_lines(doc, sel);
    let content: Vec<&LineSpan> = lines.iter().filter(|l| !l.is_blank()).collect();
    if content.is_empty() {
        return None;
    }

    let all_quoted = content.iter().all(|l| l.text.starts_with(QUOTE_PREFIX));
    let changes: Vec<Change> = if all_quoted {
        content
            .iter()
            .map(|l| Change::delete(l.from, l.from + chars(QUOTE_PREFIX)))
            .collect()
    } else {
        content
            .iter()
            .filter(|l| !l.text.starts_with(QUOTE_PREFIX))
            .map(|l| Change::insert(l.from, QUOTE_PREFIX))
            .collect()
    };
    Some(Transaction::new(changes).user_event("format.quote"))
}

pub fn is_quoted_line(line: &str) -> bool {
    line.starts_with(QUOTE_PREFIX)
}

// ============================================================================
// Lists
// ============================================================================

/// Parsed list marker of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: ListKind,
    pub indent: String,
    /// Bullet character for unordered and task items
    pub bullet: char,
    /// Number for ordered items
    pub number: u64,
    /// Char length of indent plus marker
    pub len: usize,
}

impl ListMarker {
    /// Marker for the item following this one
    pub fn next(&self) -> String {
        match self.kind {
            ListKind::Task => format!("{}{} [ ] ", self.indent, self.bullet),
            ListKind::Unordered => format!("{}{} ", self.indent, self.bullet),
            ListKind::Ordered => format!("{}{}. ", self.indent, self.number + 1),
        }
    }
}

pub fn parse_list_marker(line: &str) -> Option<ListMarker> {
    let caps = list_item_re()?.captures(line)?;
    let indent = caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
    let len = caps.get(0).map(|m| chars(m.as_str()))?;
    let (kind, bullet, number) = if let Some(b) = caps.get(2) {
        (ListKind::Task, b.as_str().chars().next().unwrap_or('-'), 0)
    } else if let Some(b) = caps.get(4) {
        (ListKind::Unordered, b.as_str().chars().next().unwrap_or('-'), 0)
    } else {
        let number = caps.get(5).and_then(|m| m.as_str().parse().ok()).unwrap_or(1);
        (ListKind::Ordered, '-', number)
    };
    Some(ListMarker {
        kind,
        indent,
        bullet,
        number,
        len,
    })
}

/// Per-kind list behaviour: predicate, strip and add
#[derive(Debug, Clone, Copy)]
pub struct ListStyle {
    pub kind: ListKind,
    pub matches: fn(&str) -> bool,
    pub strip: fn(&str) -> String,
    /// Add the marker; the index counts non-blank lines from 1
    pub add: fn(&str, usize) -> String,
}

fn is_kind(line: &str, kind: ListKind) -> bool {
    parse_list_marker(line).is_some_and(|m| m.kind == kind)
}

fn strip_marker(line: &str) -> String {
    match parse_list_marker(line) {
        Some(m) => {
            let rest: String = line.chars().skip(m.len).collect();
            format!("{}{}", m.indent, rest)
        }
        None => line.to_string(),
    }
}

fn split_indent(line: &str) -> (&str, &str) {
    let body = line.trim_start();
    (&line[..line.len() - body.len()], body)
}

impl ListStyle {
    pub fn for_kind(kind: ListKind) -> Self {
        match kind {
            ListKind::Unordered => Self {
                kind,
                matches: |l| is_kind(l, ListKind::Unordered),
                strip: strip_marker,
                add: |l, _| {
                    let (indent, body) = split_indent(l);
                    format!("{indent}- {body}")
                },
            },
            ListKind::Ordered => Self {
                kind,
                matches: |l| is_kind(l, ListKind::Ordered),
                strip: strip_marker,
                add: |l, n| {
                    let (indent, body) = split_indent(l);
                    format!("{indent}{n}. {body}")
                },
            },
            ListKind::Task => Self {
                kind,
                matches: |l| is_kind(l, ListKind::Task),
                strip: strip_marker,
                add: |l, _| {
                    let (indent, body) = split_indent(l);
                    format!("{indent}- [ ] {body}")
                },
            },
        }
    }
}

/// Toggle a list over the selected lines.
///
/// If every non-blank line already has this list's marker, all markers are
/// stripped. Otherwise lines without it gain one (after dropping any other
/// list marker), marked lines stay, and ordered lists are renumbered from 1.
/// When every selected line is blank, each one gains a marker.
pub fn toggle_list(doc: &Rope, sel: Selection, style: ListStyle) -> Option<Transaction> {
    let lines = selected_lines(doc, sel);
    let all_blank = lines.iter().all(LineSpan::is_blank);
    let all_listed = !all_blank
        && lines
            .iter()
            .filter(|l| !l.is_blank())
            .all(|l| (style.matches)(&l.text));

    let mut index = 0;
    let mut rewritten = Vec::with_capacity(lines.len());
    for line in &lines {
        let new_text = if all_listed {
            if line.is_blank() {
                line.text.clone()
            } else {
                (style.strip)(&line.text)
            }
        } else if line.is_blank() && !all_blank {
            line.text.clone()
        } else {
            index += 1;
            if (style.matches)(&line.text) && style.kind != ListKind::Ordered {
                line.text.clone()
            } else {
                (style.add)(&strip_marker(&line.text), index)
            }
        };
        rewritten.push(new_text);
    }

    let changes: Vec<Change> = lines
        .iter()
        .zip(&rewritten)
        .filter(|(old, new)| old.text != **new)
        .map(|(old, new)| Change::replace(old.from, old.to, new.clone()))
        .collect();
    if changes.is_empty() {
        return None;
    }

    let first_from = lines.first().map(|l| l.from).unwrap_or(0);
    let last = rewritten.len() - 1;
    let selection = if sel.is_empty() {
        // Cursor to the end of the transformed line
        Selection::cursor(first_from + chars(&rewritten[last]))
    } else {
        let span: usize = rewritten.iter().map(|t| chars(t)).sum::<usize>() + last;
        Selection::new(first_from, first_from + span)
    };
    Some(
        Transaction::new(changes)
            .with_selection(selection)
            .user_event("format.list"),
    )
}

/// Whether every non-blank selected line has this list kind's marker
pub fn is_list_active(doc: &Rope, sel: Selection, kind: ListKind) -> bool {
    let lines = selected_lines(doc, sel);
    let content: Vec<&LineSpan> = lines.iter().filter(|l| !l.is_blank()).collect();
    !content.is_empty() && content.iter().all(|l| is_kind(&l.text, kind))
}

/// Enter inside a list item.
///
/// An empty item loses its marker (leaving the list); otherwise the line is
/// split at the cursor and the new line starts with the next marker. `None`
/// when the cursor is not after the marker of a list item.
pub fn continue_list_on_enter(doc: &Rope, sel: Selection) -> Option<Transaction> {
    if !sel.is_empty() {
        return None;
    }
    let head = sel.head.min(doc.len_chars());
    let line = line_span(doc, doc.char_to_line(head));
    let marker = parse_list_marker(&line.text)?;
    if head < line.from + marker.len {
        return None;
    }

    let content: String = line.text.chars().skip(marker.len).collect();
    if content.trim().is_empty() {
        return Some(
            Transaction::new(vec![Change::delete(line.from, line.to)])
                .with_selection(Selection::cursor(line.from))
                .user_event("input.list.exit"),
        );
    }

    let insert = format!("\n{}", marker.next());
    let cursor = head + chars(&insert);
    Some(
        Transaction::new(vec![Change::insert(head, insert)])
            .with_selection(Selection::cursor(cursor))
            .user_event("input.list.continue"),
    )
}
