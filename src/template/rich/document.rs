//! Rich document tree.
//!
//! A [`Document`] is a tree of container [`Element`]s with text leaves.
//! Editing happens on the flat [`Block`] view: one entry per textblock,
//! carrying the chain of containers it sits in. [`Document::from_blocks`]
//! rebuilds the tree, merging neighbouring blocks that share containers.

use serde::{Deserialize, Serialize};

use crate::template::ListKind;

pub type Path = Vec<usize>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_title: Option<String>,
}

impl Marks {
    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLeaf {
    pub text: String,
    #[serde(default, skip_serializing_if = "Marks::is_plain")]
    pub marks: Marks,
}

impl TextLeaf {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Paragraph,
    Heading { level: u8 },
    Blockquote,
    BulletList,
    OrderedList,
    TaskList,
    ListItem { checked: bool },
}

impl NodeKind {
    pub fn is_textblock(self) -> bool {
        matches!(self, NodeKind::Paragraph | NodeKind::Heading { .. })
    }

    pub fn for_list(kind: ListKind) -> Self {
        match kind {
            ListKind::Unordered => NodeKind::BulletList,
            ListKind::Ordered => NodeKind::OrderedList,
            ListKind::Task => NodeKind::TaskList,
        }
    }

    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            NodeKind::BulletList => Some(ListKind::Unordered),
            NodeKind::OrderedList => Some(ListKind::Ordered),
            NodeKind::TaskList => Some(ListKind::Task),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text(TextLeaf),
}

impl Node {
    pub fn paragraph(text: &str) -> Self {
        Node::Element(Element {
            kind: NodeKind::Paragraph,
            children: vec![Node::Text(TextLeaf::plain(text))],
        })
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Node::Element(Element {
            kind: NodeKind::Heading { level },
            children: vec![Node::Text(TextLeaf::plain(text))],
        })
    }

    pub fn element(kind: NodeKind, children: Vec<Node>) -> Self {
        Node::Element(Element { kind, children })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &ix in rest {
            let Node::Element(el) = node else {
                return None;
            };
            node = el.children.get(ix)?;
        }
        Some(node)
    }

    /// Elements enclosing `path`, innermost first. The node at `path`
    /// itself is included when it is an element.
    pub fn ancestors(&self, path: &[usize]) -> Vec<&Element> {
        let mut chain = Vec::with_capacity(path.len());
        let mut children = &self.children;
        for &ix in path {
            match children.get(ix) {
                Some(Node::Element(el)) => {
                    chain.push(el);
                    children = &el.children;
                }
                _ => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Concatenated text, one line per textblock
    pub fn plain_text(&self) -> String {
        flatten(self)
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rebuild a tree from the flat view. Also returns, per block, the path
    /// of its textblock element.
    pub fn from_blocks(blocks: &[Block]) -> (Document, Vec<Path>) {
        let mut paths = vec![Vec::new(); blocks.len()];
        let indexed: Vec<usize> = (0..blocks.len()).collect();
        let children = group(blocks, &indexed, 0, &[], &mut paths);
        (Document { children }, paths)
    }
}

// ============================================================================
// Flat block view
// ============================================================================

/// A container a textblock sits in, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Blockquote,
    ListItem { list: ListKind, checked: bool },
}

impl Wrapper {
    pub fn list(self) -> Option<ListKind> {
        match self {
            Wrapper::ListItem { list, .. } => Some(list),
            Wrapper::Blockquote => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBlockKind {
    Paragraph,
    Heading(u8),
}

impl TextBlockKind {
    fn node_kind(self) -> NodeKind {
        match self {
            TextBlockKind::Paragraph => NodeKind::Paragraph,
            TextBlockKind::Heading(level) => NodeKind::Heading { level },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub wrappers: Vec<Wrapper>,
    pub kind: TextBlockKind,
    pub runs: Vec<TextLeaf>,
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Self {
            wrappers: Vec::new(),
            kind: TextBlockKind::Paragraph,
            runs: vec![TextLeaf::plain(text)],
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn len_chars(&self) -> usize {
        self.runs.iter().map(TextLeaf::len_chars).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Innermost list item wrapper, with its index
    pub fn list_item(&self) -> Option<(usize, ListKind)> {
        self.wrappers
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, w)| w.list().map(|list| (i, list)))
    }

    /// Merge adjacent runs with identical marks and drop empty ones, keeping
    /// a single empty run when the block has no text
    pub fn normalize(&mut self) {
        let mut merged: Vec<TextLeaf> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.marks == run.marks => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        if merged.is_empty() {
            merged.push(TextLeaf::default());
        }
        self.runs = merged;
    }
}

/// Flatten a tree into textblocks
pub fn flatten(doc: &Document) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut wrappers = Vec::new();
    flatten_into(&doc.children, None, &mut wrappers, &mut blocks);
    if blocks.is_empty() {
        blocks.push(Block::paragraph(""));
    }
    blocks
}

fn flatten_into(
    nodes: &[Node],
    list: Option<ListKind>,
    wrappers: &mut Vec<Wrapper>,
    out: &mut Vec<Block>,
) {
    for node in nodes {
        let Node::Element(el) = node else {
            // Stray text outside a textblock becomes its own paragraph
            if let Node::Text(leaf) = node {
                out.push(Block {
                    wrappers: wrappers.clone(),
                    kind: TextBlockKind::Paragraph,
                    runs: vec![leaf.clone()],
                });
            }
            continue;
        };
        match el.kind {
            NodeKind::Paragraph | NodeKind::Heading { .. } => {
                let kind = match el.kind {
                    NodeKind::Heading { level } => TextBlockKind::Heading(level),
                    _ => TextBlockKind::Paragraph,
                };
                let runs = el
                    .children
                    .iter()
                    .filter_map(|n| match n {
                        Node::Text(leaf) => Some(leaf.clone()),
                        Node::Element(_) => None,
                    })
                    .collect();
                let mut block = Block {
                    wrappers: wrappers.clone(),
                    kind,
                    runs,
                };
                block.normalize();
                out.push(block);
            }
            NodeKind::Blockquote => {
                wrappers.push(Wrapper::Blockquote);
                flatten_into(&el.children, None, wrappers, out);
                wrappers.pop();
            }
            NodeKind::BulletList | NodeKind::OrderedList | NodeKind::TaskList => {
                flatten_into(&el.children, el.kind.list_kind(), wrappers, out);
            }
            NodeKind::ListItem { checked } => {
                wrappers.push(Wrapper::ListItem {
                    list: list.unwrap_or(ListKind::Unordered),
                    checked,
                });
                let before = out.len();
                flatten_into(&el.children, None, wrappers, out);
                if out.len() == before {
                    out.push(Block {
                        wrappers: wrappers.clone(),
                        kind: TextBlockKind::Paragraph,
                        runs: vec![TextLeaf::default()],
                    });
                }
                wrappers.pop();
            }
        }
    }
}

/// Build the nodes for `members` (block indices) at container depth `depth`
fn group(blocks: &[Block], members: &[usize], depth: usize, prefix: &[usize], paths: &mut [Path]) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut i = 0;
    while i < members.len() {
        let block = &blocks[members[i]];
        let mut path = prefix.to_vec();
        path.push(nodes.len());

        let Some(&wrapper) = block.wrappers.get(depth) else {
            paths[members[i]] = path;
            nodes.push(Node::Element(Element {
                kind: block.kind.node_kind(),
                children: block.runs.iter().cloned().map(Node::Text).collect(),
            }));
            i += 1;
            continue;
        };

        // Maximal run of blocks sharing this container
        let start = i;
        while i < members.len() && shares_container(&blocks[members[i]], depth, wrapper) {
            i += 1;
        }
        let run = &members[start..i];

        match wrapper {
            Wrapper::Blockquote => {
                let children = group(blocks, run, depth + 1, &path, paths);
                nodes.push(Node::element(NodeKind::Blockquote, children));
            }
            Wrapper::ListItem { list, .. } => {
                let mut items = Vec::new();
                let mut item_start = 0;
                for j in 1..=run.len() {
                    // A block whose own item sits at this depth starts a new
                    // item; deeper blocks nest inside the current one
                    let starts_item = j < run.len() && blocks[run[j]].wrappers.len() == depth + 1;
                    if j == run.len() || starts_item {
                        let item_blocks = &run[item_start..j];
                        let checked = match blocks[item_blocks[0]].wrappers[depth] {
                            Wrapper::ListItem { checked, .. } => checked,
                            Wrapper::Blockquote => false,
                        };
                        let mut item_path = path.clone();
                        item_path.push(items.len());
                        let children = group(blocks, item_blocks, depth + 1, &item_path, paths);
                        items.push(Node::element(NodeKind::ListItem { checked }, children));
                        item_start = j;
                    }
                }
                nodes.push(Node::element(NodeKind::for_list(list), items));
            }
        }
    }
    nodes
}

fn shares_container(block: &Block, depth: usize, wrapper: Wrapper) -> bool {
    match (block.wrappers.get(depth), wrapper) {
        (Some(Wrapper::Blockquote), Wrapper::Blockquote) => true,
        (Some(Wrapper::ListItem { list: a, .. }), Wrapper::ListItem { list: b, .. }) => *a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(list: ListKind, text: &str) -> Block {
        Block {
            wrappers: vec![Wrapper::ListItem { list, checked: false }],
            kind: TextBlockKind::Paragraph,
            runs: vec![TextLeaf::plain(text)],
        }
    }

    #[test]
    fn test_adjacent_items_share_one_list() {
        let blocks = vec![
            Block::paragraph("intro"),
            item(ListKind::Unordered, "a"),
            item(ListKind::Unordered, "b"),
            item(ListKind::Ordered, "c"),
        ];
        let (doc, paths) = Document::from_blocks(&blocks);
        assert_eq!(doc.children.len(), 3);
        assert_eq!(paths[1], vec![1, 0, 0]);
        assert_eq!(paths[2], vec![1, 1, 0]);
        assert_eq!(paths[3], vec![2, 0, 0]);

        let Some(Node::Element(list)) = doc.node(&[1]) else {
            panic!("expected list");
        };
        assert_eq!(list.kind, NodeKind::BulletList);
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn test_nested_item_stays_inside_parent() {
        let mut nested = item(ListKind::Unordered, "child");
        nested.wrappers.insert(0, Wrapper::ListItem {
            list: ListKind::Unordered,
            checked: false,
        });
        let blocks = vec![item(ListKind::Unordered, "parent"), nested];
        let (doc, paths) = Document::from_blocks(&blocks);
        assert_eq!(paths[1], vec![0, 0, 1, 0, 0]);
        assert_eq!(flatten(&doc), blocks);
    }

    #[test]
    fn test_ancestors_innermost_first() {
        let blocks = vec![Block {
            wrappers: vec![Wrapper::Blockquote],
            kind: TextBlockKind::Heading(2),
            runs: vec![TextLeaf::plain("x")],
        }];
        let (doc, paths) = Document::from_blocks(&blocks);
        let chain = doc.ancestors(&paths[0]);
        assert_eq!(chain[0].kind, NodeKind::Heading { level: 2 });
        assert_eq!(chain[1].kind, NodeKind::Blockquote);
    }

    #[test]
    fn test_empty_document_flattens_to_one_paragraph() {
        let blocks = flatten(&Document::default());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "");
    }

    #[test]
    fn test_document_serde_tags() {
        let doc = Document::new(vec![Node::heading(1, "Title")]);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"node\":\"element\""));
        assert!(json.contains("\"type\":\"heading\""));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
