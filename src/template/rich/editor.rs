use serde::{Deserialize, Serialize};

use super::document::{flatten, Block, Document, Marks, NodeKind, Path, TextBlockKind, TextLeaf, Wrapper};
use crate::template::{BlockType, InlineMark, ListKind};
use crate::util::char_byte_index;

pub const DEFAULT_MAX_UNDO: usize = 200;

/// Location in the document as a path to a text leaf plus a char offset
/// inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// Location in the flat view: textblock index and char offset in its text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Caret {
    pub block: usize,
    pub offset: usize,
}

impl Caret {
    pub const fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RichSelection {
    pub anchor: Caret,
    pub focus: Caret,
}

impl RichSelection {
    pub fn collapsed(at: Caret) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// (start, end) in document order
    pub fn ordered(&self) -> (Caret, Caret) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub blocks: Vec<Block>,
    pub selection_before: RichSelection,
    pub selection_after: RichSelection,
}

/// Structured editor over a rich [`Document`]
#[derive(Debug, Clone)]
pub struct RichEditor {
    blocks: Vec<Block>,
    selection: RichSelection,
    /// Marks applied to the next insertion at a collapsed caret
    stored_marks: Option<Marks>,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    max_undo: usize,
    revision: u64,
}

impl Default for RichEditor {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl RichEditor {
    /// Create an editor with the caret at the end of the document
    pub fn new(doc: Document) -> Self {
        let blocks = flatten(&doc);
        let last = blocks.len() - 1;
        let end = Caret::new(last, blocks[last].len_chars());
        Self {
            blocks,
            selection: RichSelection::collapsed(end),
            stored_marks: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: DEFAULT_MAX_UNDO,
            revision: 0,
        }
    }

    pub fn from_markdown(source: &str) -> Self {
        Self::new(crate::template::markdown::parse(source))
    }

    pub fn with_max_undo(mut self, max_undo: usize) -> Self {
        self.max_undo = max_undo;
        self
    }

    pub fn to_markdown(&self) -> String {
        crate::template::markdown::render(&self.document())
    }

    pub fn document(&self) -> Document {
        Document::from_blocks(&self.blocks).0
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn plain_text(&self) -> String {
        self.blocks.iter().map(Block::text).collect::<Vec<_>>().join("\n")
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selection(&self) -> RichSelection {
        self.selection
    }

    pub fn stored_marks(&self) -> Option<&Marks> {
        self.stored_marks.as_ref()
    }

    pub fn set_selection(&mut self, anchor: Caret, focus: Caret) {
        let selection = RichSelection {
            anchor: self.clamp(anchor),
            focus: self.clamp(focus),
        };
        if selection != self.selection {
            self.stored_marks = None;
        }
        self.selection = selection;
    }

    pub fn select_all(&mut self) {
        let last = self.blocks.len() - 1;
        let end = Caret::new(last, self.blocks[last].len_chars());
        self.set_selection(Caret::default(), end);
    }

    /// Select a char range inside one block
    pub fn select_in_block(&mut self, block: usize, from: usize, to: usize) {
        self.set_selection(Caret::new(block, from), Caret::new(block, to));
    }

    fn clamp(&self, caret: Caret) -> Caret {
        let block = caret.block.min(self.blocks.len() - 1);
        Caret::new(block, caret.offset.min(self.blocks[block].len_chars()))
    }

    /// Tree location of a caret
    pub fn point(&self, caret: Caret) -> Point {
        let (_, paths) = Document::from_blocks(&self.blocks);
        let caret = self.clamp(caret);
        let block = &self.blocks[caret.block];
        let mut remaining = caret.offset;
        let mut leaf = 0;
        for (i, run) in block.runs.iter().enumerate() {
            leaf = i;
            let len = run.len_chars();
            if remaining <= len {
                break;
            }
            remaining -= len;
        }
        let mut path = paths[caret.block].clone();
        path.push(leaf);
        Point::new(path, remaining)
    }

    /// Flat location of a tree point, if the path names a text leaf
    pub fn caret_at(&self, point: &Point) -> Option<Caret> {
        let (leaf, parent) = point.path.split_last()?;
        let (_, paths) = Document::from_blocks(&self.blocks);
        let block = paths.iter().position(|p| p.as_slice() == parent)?;
        let runs = &self.blocks[block].runs;
        if *leaf >= runs.len() {
            return None;
        }
        let before: usize = runs[..*leaf].iter().map(TextLeaf::len_chars).sum();
        let offset = before + point.offset.min(runs[*leaf].len_chars());
        Some(Caret::new(block, offset))
    }

    pub fn set_selection_points(&mut self, anchor: &Point, focus: &Point) -> bool {
        match (self.caret_at(anchor), self.caret_at(focus)) {
            (Some(a), Some(f)) => {
                self.set_selection(a, f);
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };
        let blocks = std::mem::replace(&mut self.blocks, record.blocks);
        self.selection = record.selection_before;
        self.redo_stack.push(UndoRecord {
            blocks,
            selection_before: record.selection_before,
            selection_after: record.selection_after,
        });
        self.stored_marks = None;
        self.revision += 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };
        let blocks = std::mem::replace(&mut self.blocks, record.blocks);
        self.selection = record.selection_after;
        self.undo_stack.push(UndoRecord {
            blocks,
            selection_before: record.selection_before,
            selection_after: record.selection_after,
        });
        self.stored_marks = None;
        self.revision += 1;
        true
    }

    /// Run a document edit. `edit` must leave the document untouched when
    /// it returns `false`.
    fn mutate(&mut self, edit: impl FnOnce(&mut Self) -> bool) -> bool {
        let blocks = self.blocks.clone();
        let selection_before = self.selection;
        if !edit(self) {
            return false;
        }
        if self.blocks == blocks {
            return true;
        }
        self.undo_stack.push(UndoRecord {
            blocks,
            selection_before,
            selection_after: self.selection,
        });
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        self.revision += 1;
        true
    }

    // ------------------------------------------------------------------------
    // Text editing
    // ------------------------------------------------------------------------

    /// Insert text at the selection. Newlines split blocks.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let marks = self.insertion_marks();
        self.mutate(|ed| {
            ed.delete_selection_inner();
            for (i, piece) in text.split('\n').enumerate() {
                if i > 0 {
                    ed.split_inner();
                }
                if !piece.is_empty() {
                    let caret = ed.selection.focus;
                    insert_run(&mut ed.blocks[caret.block], caret.offset, TextLeaf::with_marks(piece, marks.clone()));
                    ed.selection = RichSelection::collapsed(Caret::new(caret.block, caret.offset + piece.chars().count()));
                }
            }
            true
        })
    }

    /// Backspace. At the start of a wrapped or heading block this lifts the
    /// block one level instead of joining it with the previous one.
    pub fn delete_backward(&mut self) -> bool {
        self.mutate(|ed| {
            if !ed.selection.is_collapsed() {
                ed.delete_selection_inner();
                return true;
            }
            let caret = ed.selection.focus;
            let block = &mut ed.blocks[caret.block];
            if caret.offset > 0 {
                remove_range(block, caret.offset - 1, caret.offset);
                ed.selection = RichSelection::collapsed(Caret::new(caret.block, caret.offset - 1));
                return true;
            }
            if block.wrappers.pop().is_some() {
                return true;
            }
            if block.kind != TextBlockKind::Paragraph {
                block.kind = TextBlockKind::Paragraph;
                return true;
            }
            if caret.block == 0 {
                return false;
            }
            let removed = ed.blocks.remove(caret.block);
            let prev = &mut ed.blocks[caret.block - 1];
            let join_at = prev.len_chars();
            prev.runs.extend(removed.runs);
            prev.normalize();
            ed.selection = RichSelection::collapsed(Caret::new(caret.block - 1, join_at));
            true
        })
    }

    /// Enter. An empty list item leaves its list instead of splitting.
    pub fn split_block(&mut self) -> bool {
        self.mutate(|ed| {
            ed.delete_selection_inner();
            let caret = ed.selection.focus;
            let block = &mut ed.blocks[caret.block];
            if let Some((ix, _)) = block.list_item() {
                if block.len_chars() == 0 {
                    block.wrappers.remove(ix);
                    return true;
                }
            }
            ed.split_inner();
            true
        })
    }

    fn split_inner(&mut self) {
        let caret = self.selection.focus;
        let block = &mut self.blocks[caret.block];
        let at_end = caret.offset >= block.len_chars();
        let split = split_runs_at(block, caret.offset);
        let tail_runs = block.runs.split_off(split);
        block.normalize();

        let mut wrappers = block.wrappers.clone();
        if let Some((ix, list)) = block.list_item() {
            wrappers[ix] = Wrapper::ListItem { list, checked: false };
        }
        let kind = if at_end { TextBlockKind::Paragraph } else { block.kind };
        let mut tail = Block {
            wrappers,
            kind,
            runs: tail_runs,
        };
        tail.normalize();
        self.blocks.insert(caret.block + 1, tail);
        self.selection = RichSelection::collapsed(Caret::new(caret.block + 1, 0));
    }

    fn delete_selection_inner(&mut self) {
        if self.selection.is_collapsed() {
            return;
        }
        let (start, end) = self.selection.ordered();
        if start.block == end.block {
            remove_range(&mut self.blocks[start.block], start.offset, end.offset);
        } else {
            let end_len = self.blocks[end.block].len_chars();
            let mut tail = self.blocks[end.block].clone();
            remove_range(&mut tail, 0, end.offset.min(end_len));
            let first = &mut self.blocks[start.block];
            let first_len = first.len_chars();
            remove_range(first, start.offset, first_len);
            first.runs.extend(tail.runs);
            first.normalize();
            self.blocks.drain(start.block + 1..=end.block);
        }
        self.selection = RichSelection::collapsed(start);
    }

    // ------------------------------------------------------------------------
    // Marks
    // ------------------------------------------------------------------------

    fn marks_at_caret(&self) -> Marks {
        let caret = self.selection.focus;
        let block = &self.blocks[caret.block];
        let mut pos = 0;
        for run in &block.runs {
            let len = run.len_chars();
            if caret.offset > pos && caret.offset <= pos + len {
                return run.marks.clone();
            }
            pos += len;
        }
        block.runs.first().map(|r| r.marks.clone()).unwrap_or_default()
    }

    fn insertion_marks(&self) -> Marks {
        self.stored_marks.clone().unwrap_or_else(|| self.marks_at_caret())
    }

    /// Plain text under the selection, blocks joined by `\n`
    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection.ordered();
        let mut parts = Vec::new();
        for b in start.block..=end.block {
            let text = self.blocks[b].text();
            let from = if b == start.block { start.offset } else { 0 };
            let to = if b == end.block { end.offset } else { text.chars().count() };
            parts.push(text.chars().skip(from).take(to.saturating_sub(from)).collect::<String>());
        }
        parts.join("\n")
    }

    /// Runs covered by the selection, per block
    fn selected_runs(&self) -> Vec<&TextLeaf> {
        let (start, end) = self.selection.ordered();
        let mut out = Vec::new();
        for b in start.block..=end.block {
            let block = &self.blocks[b];
            let from = if b == start.block { start.offset } else { 0 };
            let to = if b == end.block { end.offset } else { block.len_chars() };
            let mut pos = 0;
            for run in &block.runs {
                let len = run.len_chars();
                if len > 0 && pos < to && pos + len > from {
                    out.push(run);
                }
                pos += len;
            }
        }
        out
    }

    /// Rewrite the marks of every run inside the selection
    fn update_marks(&mut self, mut f: impl FnMut(&mut Marks)) {
        let (start, end) = self.selection.ordered();
        for b in start.block..=end.block {
            let block = &mut self.blocks[b];
            let from = if b == start.block { start.offset } else { 0 };
            let to = if b == end.block { end.offset } else { block.len_chars() };
            if from >= to {
                continue;
            }
            let first = split_runs_at(block, from);
            let last = split_runs_at(block, to);
            for run in &mut block.runs[first..last] {
                f(&mut run.marks);
            }
            block.normalize();
        }
    }

    pub fn is_mark_active(&self, mark: InlineMark) -> bool {
        let has = |marks: &Marks| match mark {
            InlineMark::Bold => marks.bold,
            InlineMark::Italic => marks.italic,
            InlineMark::Link => marks.link.is_some(),
        };
        if self.selection.is_collapsed() {
            return has(&self.insertion_marks());
        }
        let runs = self.selected_runs();
        !runs.is_empty() && runs.iter().all(|r| has(&r.marks))
    }

    /// Toggle bold or italic. A collapsed caret toggles the stored marks
    /// for the next insertion.
    pub fn toggle_mark(&mut self, mark: InlineMark) -> bool {
        let flip = |marks: &mut Marks, on: bool| match mark {
            InlineMark::Bold => marks.bold = on,
            InlineMark::Italic => marks.italic = on,
            InlineMark::Link => {}
        };
        if mark == InlineMark::Link {
            return false;
        }
        let on = !self.is_mark_active(mark);
        if self.selection.is_collapsed() {
            let mut marks = self.insertion_marks();
            flip(&mut marks, on);
            self.stored_marks = Some(marks);
            return true;
        }
        self.mutate(|ed| {
            ed.update_marks(|m| flip(m, on));
            true
        })
    }

    /// Href and title of the link under the selection
    pub fn link_at_selection(&self) -> Option<(String, Option<String>)> {
        let marks = if self.selection.is_collapsed() {
            self.marks_at_caret()
        } else {
            self.selected_runs().first()?.marks.clone()
        };
        marks.link.map(|href| (href, marks.link_title))
    }

    /// Apply a link over the selection. A collapsed caret inserts the title
    /// (or the href) as linked text.
    pub fn set_link(&mut self, href: &str, title: Option<&str>) -> bool {
        let href = href.trim();
        if href.is_empty() {
            return false;
        }
        let title = title.map(str::trim).filter(|t| !t.is_empty());
        self.mutate(|ed| {
            if ed.selection.is_collapsed() {
                let caret = ed.selection.focus;
                let mut marks = ed.insertion_marks();
                marks.link = Some(href.to_string());
                marks.link_title = None;
                let text = title.unwrap_or(href);
                insert_run(&mut ed.blocks[caret.block], caret.offset, TextLeaf::with_marks(text, marks));
                ed.selection = RichSelection::collapsed(Caret::new(caret.block, caret.offset + text.chars().count()));
            } else {
                ed.update_marks(|m| {
                    m.link = Some(href.to_string());
                    m.link_title = title.map(String::from);
                });
            }
            true
        })
    }

    /// Remove the link under the selection. A collapsed caret clears the
    /// whole contiguous link it sits in.
    pub fn remove_link(&mut self) -> bool {
        if !self.selection.is_collapsed() {
            if !self.selected_runs().iter().any(|r| r.marks.link.is_some()) {
                return false;
            }
            return self.mutate(|ed| {
                ed.update_marks(|m| {
                    m.link = None;
                    m.link_title = None;
                });
                true
            });
        }

        let Some((href, _)) = self.link_at_selection() else {
            return false;
        };
        let caret = self.selection.focus;
        let block = &self.blocks[caret.block];
        // Locate the run under the caret, then widen over same-href neighbours
        let mut pos = 0;
        let mut hit = 0;
        for (i, run) in block.runs.iter().enumerate() {
            let len = run.len_chars();
            if caret.offset > pos && caret.offset <= pos + len {
                hit = i;
                break;
            }
            pos += len;
        }
        let same = |i: usize| block.runs[i].marks.link.as_deref() == Some(href.as_str());
        let mut first = hit;
        while first > 0 && same(first - 1) {
            first -= 1;
        }
        let mut last = hit;
        while last + 1 < block.runs.len() && same(last + 1) {
            last += 1;
        }
        self.mutate(|ed| {
            for run in &mut ed.blocks[caret.block].runs[first..=last] {
                run.marks.link = None;
                run.marks.link_title = None;
            }
            ed.blocks[caret.block].normalize();
            true
        })
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    fn selected_blocks(&self) -> std::ops::RangeInclusive<usize> {
        let (start, end) = self.selection.ordered();
        start.block..=end.block
    }

    /// Non-blank blocks in the selection, or every selected block when all
    /// of them are blank
    fn structural_targets(&self) -> Vec<usize> {
        let range = self.selected_blocks();
        let non_blank: Vec<usize> = range.clone().filter(|&b| !self.blocks[b].is_blank()).collect();
        if non_blank.is_empty() {
            range.collect()
        } else {
            non_blank
        }
    }

    pub fn toggle_heading(&mut self, level: u8) -> bool {
        let level = level.clamp(1, 6);
        let range = self.selected_blocks();
        let all_set = range.clone().all(|b| self.blocks[b].kind == TextBlockKind::Heading(level));
        let kind = if all_set {
            TextBlockKind::Paragraph
        } else {
            TextBlockKind::Heading(level)
        };
        self.mutate(|ed| {
            for b in range {
                ed.blocks[b].kind = kind;
            }
            true
        })
    }

    pub fn set_paragraph(&mut self) -> bool {
        let range = self.selected_blocks();
        if range.clone().all(|b| self.blocks[b].kind == TextBlockKind::Paragraph) {
            return false;
        }
        self.mutate(|ed| {
            for b in range {
                ed.blocks[b].kind = TextBlockKind::Paragraph;
            }
            true
        })
    }

    pub fn toggle_blockquote(&mut self) -> bool {
        let targets = self.structural_targets();
        let quoted = |b: &Block| b.wrappers.contains(&Wrapper::Blockquote);
        let all_quoted = targets.iter().all(|&b| quoted(&self.blocks[b]));
        self.mutate(|ed| {
            for &b in &targets {
                let block = &mut ed.blocks[b];
                if all_quoted {
                    if let Some(ix) = block.wrappers.iter().position(|w| *w == Wrapper::Blockquote) {
                        block.wrappers.remove(ix);
                    }
                } else if !quoted(&*block) {
                    block.wrappers.insert(0, Wrapper::Blockquote);
                }
            }
            true
        })
    }

    /// Add, convert or remove list membership for the selected blocks
    pub fn toggle_list(&mut self, kind: ListKind) -> bool {
        let targets = self.structural_targets();
        let all_listed = targets
            .iter()
            .all(|&b| self.blocks[b].list_item().map(|(_, k)| k) == Some(kind));
        self.mutate(|ed| {
            for &b in &targets {
                let block = &mut ed.blocks[b];
                match block.list_item() {
                    Some((ix, _)) if all_listed => {
                        block.wrappers.remove(ix);
                    }
                    Some((ix, current)) if current != kind => {
                        block.wrappers[ix] = Wrapper::ListItem {
                            list: kind,
                            checked: false,
                        };
                    }
                    Some(_) => {}
                    None => block.wrappers.push(Wrapper::ListItem {
                        list: kind,
                        checked: false,
                    }),
                }
            }
            true
        })
    }

    /// Flip the checkbox of the task item under the caret
    pub fn toggle_checked(&mut self) -> bool {
        let b = self.selection.focus.block;
        let Some((ix, ListKind::Task)) = self.blocks[b].list_item() else {
            return false;
        };
        self.mutate(|ed| {
            if let Wrapper::ListItem { checked, .. } = &mut ed.blocks[b].wrappers[ix] {
                *checked = !*checked;
            }
            true
        })
    }

    pub fn in_list_item(&self) -> bool {
        self.blocks[self.selection.focus.block].list_item().is_some()
    }

    /// Whether a block construct encloses the caret, found by walking the
    /// caret's ancestor chain in the document tree
    pub fn is_block_active(&self, block: BlockType) -> bool {
        let (doc, paths) = Document::from_blocks(&self.blocks);
        let chain = doc.ancestors(&paths[self.selection.focus.block]);
        match block {
            BlockType::Paragraph => chain.first().is_some_and(|el| el.kind == NodeKind::Paragraph),
            BlockType::Heading(level) => chain
                .first()
                .is_some_and(|el| el.kind == NodeKind::Heading { level }),
            BlockType::Blockquote => chain.iter().any(|el| el.kind == NodeKind::Blockquote),
        }
    }

    /// A list is active when some enclosing list item's immediate parent is
    /// a list of that kind
    pub fn is_list_active(&self, kind: ListKind) -> bool {
        let (doc, paths) = Document::from_blocks(&self.blocks);
        let chain = doc.ancestors(&paths[self.selection.focus.block]);
        let list = NodeKind::for_list(kind);
        chain
            .windows(2)
            .any(|pair| matches!(pair[0].kind, NodeKind::ListItem { .. }) && pair[1].kind == list)
    }
}

/// Split the run containing `offset` so a run boundary falls there. Returns
/// the index of the first run at or after `offset`.
fn split_runs_at(block: &mut Block, offset: usize) -> usize {
    let mut pos = 0;
    for i in 0..block.runs.len() {
        if offset == pos {
            return i;
        }
        let len = block.runs[i].len_chars();
        if offset < pos + len {
            let byte = char_byte_index(&block.runs[i].text, offset - pos);
            let tail = block.runs[i].text.split_off(byte);
            let marks = block.runs[i].marks.clone();
            block.runs.insert(i + 1, TextLeaf::with_marks(tail, marks));
            return i + 1;
        }
        pos += len;
    }
    block.runs.len()
}

fn insert_run(block: &mut Block, offset: usize, leaf: TextLeaf) {
    let at = split_runs_at(block, offset);
    block.runs.insert(at, leaf);
    block.normalize();
}

fn remove_range(block: &mut Block, from: usize, to: usize) {
    if from >= to {
        return;
    }
    let first = split_runs_at(block, from);
    let last = split_runs_at(block, to);
    block.runs.drain(first..last);
    block.normalize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::rich::document::Node;

    fn editor(paragraphs: &[&str]) -> RichEditor {
        RichEditor::new(Document::new(paragraphs.iter().map(|p| Node::paragraph(p)).collect()))
    }

    #[test]
    fn test_insert_uses_stored_marks() {
        let mut ed = editor(&["ab"]);
        assert!(ed.toggle_mark(InlineMark::Bold));
        assert!(ed.is_mark_active(InlineMark::Bold));
        ed.insert_text("c");
        let runs = &ed.blocks()[0].runs;
        assert_eq!(runs.len(), 2);
        assert!(runs[1].marks.bold);
        assert_eq!(runs[1].text, "c");
    }

    #[test]
    fn test_point_round_trip() {
        let mut ed = editor(&["hello world"]);
        ed.select_in_block(0, 6, 11);
        ed.toggle_mark(InlineMark::Italic);
        let point = ed.point(Caret::new(0, 8));
        assert_eq!(point, Point::new(vec![0, 1], 2));
        assert_eq!(ed.caret_at(&point), Some(Caret::new(0, 8)));
    }

    #[test]
    fn test_backspace_at_start_lifts_then_joins() {
        let mut ed = editor(&["a", "b"]);
        ed.set_selection(Caret::new(1, 0), Caret::new(1, 0));
        ed.toggle_list(ListKind::Unordered);
        assert!(ed.delete_backward());
        assert!(ed.blocks()[1].wrappers.is_empty());
        assert!(ed.delete_backward());
        assert_eq!(ed.plain_text(), "ab");
        assert_eq!(ed.selection().focus, Caret::new(0, 1));
    }

    #[test]
    fn test_cross_block_delete() {
        let mut ed = editor(&["one", "two", "three"]);
        ed.set_selection(Caret::new(0, 1), Caret::new(2, 2));
        ed.delete_backward();
        assert_eq!(ed.plain_text(), "oree");
    }

    #[test]
    fn test_undo_depth_is_bounded() {
        let mut ed = editor(&[""]).with_max_undo(3);
        for ch in ["a", "b", "c", "d", "e"] {
            ed.insert_text(ch);
        }
        let mut undone = 0;
        while ed.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(ed.plain_text(), "ab");
    }
}
