//! Markdown conversion for the rich engine.
//!
//! Parsing goes through pulldown-cmark. Constructs the rich engine has no
//! node for (code blocks, tables, HTML, images) are kept as literal source
//! text so a raw → rich → raw trip does not lose them. Runs of extra blank
//! lines between top-level blocks become empty paragraphs.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use super::rich::{Document, Element, Marks, Node, NodeKind, TextLeaf};

pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

struct Open {
    kind: NodeKind,
    children: Vec<Node>,
    /// Textblock opened for bare text inside a tight list item
    implicit: bool,
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Open>,
    bold: usize,
    italic: usize,
    links: Vec<(String, Option<String>)>,
    /// Line span of the top-level node being built
    top_lines: Option<(usize, usize)>,
    last_top_end: Option<usize>,
}

impl TreeBuilder {
    fn marks(&self) -> Marks {
        let link = self.links.last();
        Marks {
            bold: self.bold > 0,
            italic: self.italic > 0,
            link: link.map(|(href, _)| href.clone()),
            link_title: link.and_then(|(_, title)| title.clone()),
        }
    }

    fn open(&mut self, kind: NodeKind, lines: (usize, usize), implicit: bool) {
        if self.stack.is_empty() {
            self.top_lines = Some(lines);
        }
        self.stack.push(Open {
            kind,
            children: Vec::new(),
            implicit,
        });
    }

    fn close(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let node = Node::Element(Element {
            kind: open.kind,
            children: open.children,
        });
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.push_top(node),
        }
    }

    fn push_top(&mut self, node: Node) {
        let (start, end) = self.top_lines.take().unwrap_or((0, 0));
        let blank = match self.last_top_end {
            Some(prev) => start.saturating_sub(prev + 1).saturating_sub(1),
            None => start,
        };
        for _ in 0..blank {
            self.root.push(Node::paragraph(""));
        }
        self.root.push(node);
        self.last_top_end = Some(end);
    }

    fn close_implicit(&mut self) {
        if self.stack.last().is_some_and(|o| o.implicit) {
            self.close();
        }
    }

    fn text(&mut self, text: &str, lines: (usize, usize)) {
        if text.is_empty() {
            return;
        }
        if !self.stack.last().is_some_and(|o| o.kind.is_textblock()) {
            self.open(NodeKind::Paragraph, lines, true);
        }
        let leaf = TextLeaf::with_marks(text, self.marks());
        if let Some(top) = self.stack.last_mut() {
            top.children.push(Node::Text(leaf));
        }
    }

    /// A block the rich engine keeps as literal source
    fn raw_block(&mut self, source: &str, lines: (usize, usize)) {
        self.close_implicit();
        let node = Node::paragraph(source.trim_end_matches(['\n', '\r']));
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                self.top_lines = Some(lines);
                self.push_top(node);
            }
        }
    }

    fn task_marker(&mut self, checked: bool) {
        let Some(item) = self
            .stack
            .iter()
            .rposition(|o| matches!(o.kind, NodeKind::ListItem { .. }))
        else {
            return;
        };
        self.stack[item].kind = NodeKind::ListItem { checked };
        if item > 0 {
            self.stack[item - 1].kind = NodeKind::TaskList;
        }
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count()
}

fn line_span(source: &str, range: &std::ops::Range<usize>) -> (usize, usize) {
    let end = source[..range.end.min(source.len())]
        .trim_end_matches(['\n', '\r'])
        .len()
        .max(range.start);
    (line_of(source, range.start), line_of(source, end))
}

/// Parse markdown source into a rich document
pub fn parse(source: &str) -> Document {
    let mut b = TreeBuilder::default();
    // Nesting depth of a construct being skipped as raw source
    let mut skipping = 0usize;

    for (event, range) in Parser::new_ext(source, parser_options()).into_offset_iter() {
        if skipping > 0 {
            match event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                _ => {}
            }
            continue;
        }
        let lines = line_span(source, &range);

        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => b.open(NodeKind::Paragraph, lines, false),
                Tag::Heading { level, .. } => b.open(NodeKind::Heading { level: level as u8 }, lines, false),
                Tag::BlockQuote(_) => {
                    b.close_implicit();
                    b.open(NodeKind::Blockquote, lines, false);
                }
                Tag::List(start) => {
                    b.close_implicit();
                    let kind = if start.is_some() {
                        NodeKind::OrderedList
                    } else {
                        NodeKind::BulletList
                    };
                    b.open(kind, lines, false);
                }
                Tag::Item => {
                    b.close_implicit();
                    b.open(NodeKind::ListItem { checked: false }, lines, false);
                }
                Tag::Strong => b.bold += 1,
                Tag::Emphasis => b.italic += 1,
                Tag::Link { dest_url, title, .. } => {
                    let title = (!title.is_empty()).then(|| title.to_string());
                    b.links.push((dest_url.to_string(), title));
                }
                Tag::Image { .. } => {
                    b.text(&source[range.clone()], lines);
                    skipping = 1;
                }
                Tag::CodeBlock(_) | Tag::HtmlBlock | Tag::Table(_) | Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {
                    b.raw_block(&source[range.clone()], lines);
                    skipping = 1;
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Paragraph | TagEnd::Heading(_) => b.close(),
                TagEnd::BlockQuote(_) | TagEnd::List(_) | TagEnd::Item => {
                    b.close_implicit();
                    b.close();
                }
                TagEnd::Strong => b.bold = b.bold.saturating_sub(1),
                TagEnd::Emphasis => b.italic = b.italic.saturating_sub(1),
                TagEnd::Link => {
                    b.links.pop();
                }
                _ => {}
            },
            Event::Text(text) => b.text(&text, lines),
            Event::Code(_) | Event::InlineHtml(_) | Event::Html(_) => b.text(&source[range.clone()], lines),
            Event::SoftBreak | Event::HardBreak => b.text("\n", lines),
            Event::TaskListMarker(checked) => b.task_marker(checked),
            Event::Rule => b.raw_block(&source[range.clone()], lines),
            _ => {}
        }
    }

    while !b.stack.is_empty() {
        b.close();
    }
    // Blank lines after the last block; a single final newline is dropped
    if b.last_top_end.is_some() {
        let content = source.trim_end_matches(['\n', '\r']).len();
        let trailing = source[content..].matches('\n').count();
        for _ in 0..trailing.saturating_sub(1) {
            b.root.push(Node::paragraph(""));
        }
    }
    Document::new(b.root)
}

// ============================================================================
// Rendering
// ============================================================================

fn is_empty_paragraph(node: &Node) -> bool {
    match node {
        Node::Element(el) if el.kind == NodeKind::Paragraph => el.children.iter().all(|c| match c {
            Node::Text(leaf) => leaf.text.is_empty(),
            Node::Element(_) => false,
        }),
        _ => false,
    }
}

/// Serialize a rich document back to markdown source
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    let mut pending_blank = 0;
    let mut first = true;
    for node in &doc.children {
        if is_empty_paragraph(node) {
            pending_blank += 1;
            continue;
        }
        if !first {
            out.push_str("\n\n");
        }
        for _ in 0..pending_blank {
            out.push('\n');
        }
        out.push_str(&render_node(node).join("\n"));
        first = false;
        pending_blank = 0;
    }
    if !first && pending_blank > 0 {
        out.push_str(&"\n".repeat(pending_blank + 1));
    }
    out
}

fn render_node(node: &Node) -> Vec<String> {
    let el = match node {
        Node::Element(el) => el,
        Node::Text(leaf) => return vec![render_leaf(leaf)],
    };
    match el.kind {
        NodeKind::Paragraph => render_inline(&el.children).split('\n').map(String::from).collect(),
        NodeKind::Heading { level } => {
            let text = render_inline(&el.children).replace('\n', " ");
            vec![format!("{} {}", "#".repeat(level.clamp(1, 6) as usize), text)]
        }
        NodeKind::Blockquote => {
            let mut lines = Vec::new();
            for (i, child) in el.children.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                lines.extend(render_node(child));
            }
            lines
                .into_iter()
                .map(|l| if l.is_empty() { ">".to_string() } else { format!("> {l}") })
                .collect()
        }
        NodeKind::BulletList | NodeKind::OrderedList | NodeKind::TaskList => {
            let mut lines = Vec::new();
            for (i, item) in el.children.iter().enumerate() {
                let marker = match (el.kind, item) {
                    (NodeKind::OrderedList, _) => format!("{}. ", i + 1),
                    (
                        NodeKind::TaskList,
                        Node::Element(Element {
                            kind: NodeKind::ListItem { checked: true },
                            ..
                        }),
                    ) => "- [x] ".to_string(),
                    (NodeKind::TaskList, _) => "- [ ] ".to_string(),
                    _ => "- ".to_string(),
                };
                let body = match item {
                    Node::Element(item) if matches!(item.kind, NodeKind::ListItem { .. }) => {
                        item.children.iter().flat_map(render_node).collect()
                    }
                    other => render_node(other),
                };
                let body: Vec<String> = body;
                if body.is_empty() {
                    lines.push(marker.trim_end().to_string());
                }
                let indent = " ".repeat(marker.len().min(4));
                for (j, line) in body.into_iter().enumerate() {
                    if j == 0 {
                        lines.push(format!("{marker}{line}"));
                    } else if line.is_empty() {
                        lines.push(line);
                    } else {
                        lines.push(format!("{indent}{line}"));
                    }
                }
            }
            lines
        }
        NodeKind::ListItem { .. } => el.children.iter().flat_map(render_node).collect(),
    }
}

fn render_inline(children: &[Node]) -> String {
    let leaves: Vec<&TextLeaf> = children
        .iter()
        .filter_map(|n| match n {
            Node::Text(leaf) => Some(leaf),
            Node::Element(_) => None,
        })
        .collect();

    let mut out = String::new();
    let mut i = 0;
    while i < leaves.len() {
        let link = (&leaves[i].marks.link, &leaves[i].marks.link_title);
        let mut j = i;
        let mut inner = String::new();
        while j < leaves.len() && (&leaves[j].marks.link, &leaves[j].marks.link_title) == link {
            inner.push_str(&render_leaf(leaves[j]));
            j += 1;
        }
        match link {
            (Some(href), Some(title)) => out.push_str(&format!("[{inner}]({href} \"{title}\")")),
            (Some(href), None) => out.push_str(&format!("[{inner}]({href})")),
            _ => out.push_str(&inner),
        }
        i = j;
    }
    out
}

/// Emphasis delimiters around a leaf, keeping edge whitespace outside them
fn render_leaf(leaf: &TextLeaf) -> String {
    let text = leaf.text.as_str();
    if !leaf.marks.bold && !leaf.marks.italic {
        return text.to_string();
    }
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[lead.len() + core.len()..];
    let mut wrapped = core.to_string();
    if leaf.marks.italic {
        wrapped = format!("_{wrapped}_");
    }
    if leaf.marks.bold {
        wrapped = format!("**{wrapped}**");
    }
    format!("{lead}{wrapped}{trail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_common_constructs() {
        let md = "# Title\n\nSome **bold** and _it_ text.\n\n- a\n- b\n\n1. x\n2. y\n\n- [ ] todo\n- [x] done\n\n> quote\n\n[docs](https://example.com)";
        assert_eq!(render(&parse(md)), md);
    }

    #[test]
    fn test_extra_blank_lines_survive() {
        let md = "first\n\n\n\nsecond";
        let doc = parse(md);
        assert_eq!(doc.children.len(), 4);
        assert_eq!(render(&doc), md);
    }

    #[test]
    fn test_task_list_marks_items() {
        let doc = parse("- [x] done\n- [ ] open");
        let Node::Element(list) = &doc.children[0] else {
            panic!("expected list");
        };
        assert_eq!(list.kind, NodeKind::TaskList);
        assert!(matches!(
            &list.children[0],
            Node::Element(Element {
                kind: NodeKind::ListItem { checked: true },
                ..
            })
        ));
    }

    #[test]
    fn test_code_block_kept_literally() {
        let md = "intro\n\n```sql\nselect 1\n```";
        assert_eq!(render(&parse(md)), md);
    }

    #[test]
    fn test_soft_break_kept_inside_paragraph() {
        let md = "line one\nline two";
        let doc = parse(md);
        assert_eq!(doc.children.len(), 1);
        assert_eq!(render(&doc), md);
    }

    #[test]
    fn test_emphasis_keeps_whitespace_outside() {
        let leaf = TextLeaf::with_marks(
            "bold ",
            Marks {
                bold: true,
                ..Marks::default()
            },
        );
        assert_eq!(render_leaf(&leaf), "**bold** ");
    }
}
