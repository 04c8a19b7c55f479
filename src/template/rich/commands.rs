use super::RichEditor;
use crate::template::{ActiveQuery, BlockType, InlineMark, ListKind, StructuredEditing};

/// Markdown commands over the rich engine
#[derive(Debug)]
pub struct RichCommands<'a> {
    editor: Option<&'a mut RichEditor>,
}

impl<'a> RichCommands<'a> {
    pub fn new(editor: Option<&'a mut RichEditor>) -> Self {
        Self { editor }
    }

    fn with(&mut self, f: impl FnOnce(&mut RichEditor) -> bool) -> bool {
        self.editor.as_deref_mut().is_some_and(f)
    }
}

impl StructuredEditing for RichCommands<'_> {
    fn toggle_inline(&mut self, mark: InlineMark) -> bool {
        match mark {
            InlineMark::Link => self.toggle_link(None),
            mark => self.with(|ed| ed.toggle_mark(mark)),
        }
    }

    /// Removes an existing link, otherwise needs an href to add one
    fn toggle_link(&mut self, href: Option<&str>) -> bool {
        self.with(|ed| {
            if ed.is_mark_active(InlineMark::Link) {
                return ed.remove_link();
            }
            match href {
                Some(href) => ed.set_link(href, None),
                None => false,
            }
        })
    }

    fn toggle_block(&mut self, block: BlockType) -> bool {
        self.with(|ed| match block {
            BlockType::Paragraph => ed.set_paragraph(),
            BlockType::Heading(level) => ed.toggle_heading(level),
            BlockType::Blockquote => ed.toggle_blockquote(),
        })
    }

    fn toggle_list(&mut self, kind: ListKind) -> bool {
        self.with(|ed| ed.toggle_list(kind))
    }

    fn continue_list(&mut self) -> bool {
        self.with(|ed| ed.in_list_item() && ed.split_block())
    }

    fn is_active(&self, query: ActiveQuery) -> bool {
        let Some(ed) = self.editor.as_deref() else {
            return false;
        };
        match query {
            ActiveQuery::Mark(mark) => ed.is_mark_active(mark),
            ActiveQuery::Block(block) => ed.is_block_active(block),
            ActiveQuery::List(kind) => ed.is_list_active(kind),
        }
    }

    fn undo(&mut self) -> bool {
        self.with(RichEditor::undo)
    }

    fn redo(&mut self) -> bool {
        self.with(RichEditor::redo)
    }

    fn can_undo(&self) -> bool {
        self.editor.as_deref().is_some_and(RichEditor::can_undo)
    }

    fn can_redo(&self) -> bool {
        self.editor.as_deref().is_some_and(RichEditor::can_redo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_commands_are_noops() {
        let mut cmds = RichCommands::new(None);
        assert!(!cmds.toggle_inline(InlineMark::Bold));
        assert!(!cmds.toggle_list(ListKind::Task));
        assert!(!cmds.is_active(ActiveQuery::Block(BlockType::Paragraph)));
        assert!(!cmds.undo());
    }

    #[test]
    fn test_link_needs_target_unless_removing() {
        let mut ed = RichEditor::from_markdown("see docs");
        ed.select_in_block(0, 4, 8);
        let mut cmds = RichCommands::new(Some(&mut ed));
        assert!(!cmds.toggle_link(None));
        assert!(cmds.toggle_link(Some("https://example.com")));
        assert!(cmds.is_active(ActiveQuery::Mark(InlineMark::Link)));
        assert!(cmds.toggle_link(None));
        assert!(!cmds.is_active(ActiveQuery::Mark(InlineMark::Link)));
    }
}
