use super::text::{self, ListStyle};
use super::{ActiveQuery, BlockType, InlineMark, ListKind, StructuredEditing};
use crate::editable::{CodeEngine, Transaction};

/// Markdown commands over the plain-text engine
#[derive(Debug)]
pub struct CodeCommands<'a> {
    engine: Option<&'a mut CodeEngine>,
}

impl<'a> CodeCommands<'a> {
    pub fn new(engine: Option<&'a mut CodeEngine>) -> Self {
        Self { engine }
    }

    fn run(&mut self, build: impl FnOnce(&CodeEngine) -> Option<Transaction>) -> bool {
        let Some(engine) = self.engine.as_deref_mut() else {
            return false;
        };
        match build(engine) {
            Some(tr) => engine.dispatch(tr).is_some(),
            None => false,
        }
    }

    fn current_line(engine: &CodeEngine) -> String {
        engine.line_at(engine.selection().head).text
    }
}

impl StructuredEditing for CodeCommands<'_> {
    fn toggle_inline(&mut self, mark: InlineMark) -> bool {
        match mark.delimiters() {
            Some((prefix, suffix)) => {
                self.run(|e| Some(text::toggle_wrap(e.doc(), e.selection(), prefix, suffix)))
            }
            None => self.toggle_link(None),
        }
    }

    /// Source editing inserts placeholder markup, so no target is needed
    fn toggle_link(&mut self, _href: Option<&str>) -> bool {
        self.run(|e| text::toggle_link(e.doc(), e.selection()))
    }

    fn toggle_block(&mut self, block: BlockType) -> bool {
        match block {
            BlockType::Heading(level) => self.run(|e| text::toggle_heading(e.doc(), e.selection(), level)),
            BlockType::Blockquote => self.run(|e| text::toggle_blockquote(e.doc(), e.selection())),
            BlockType::Paragraph => self.run(|e| {
                // Clear whatever heading the line has
                let level = text::heading_level(&Self::current_line(e))?;
                text::toggle_heading(e.doc(), e.selection(), level)
            }),
        }
    }

    fn toggle_list(&mut self, kind: ListKind) -> bool {
        self.run(|e| text::toggle_list(e.doc(), e.selection(), ListStyle::for_kind(kind)))
    }

    fn continue_list(&mut self) -> bool {
        self.run(|e| text::continue_list_on_enter(e.doc(), e.selection()))
    }

    fn is_active(&self, query: ActiveQuery) -> bool {
        let Some(engine) = self.engine.as_deref() else {
            return false;
        };
        let (doc, sel) = (engine.doc(), engine.selection());
        match query {
            ActiveQuery::Mark(InlineMark::Link) => {
                text::toggle_link(doc, sel).is_some_and(|tr| tr.annotations.user_event == Some("format.unlink"))
            }
            ActiveQuery::Mark(mark) => mark
                .delimiters()
                .is_some_and(|(p, s)| text::is_wrapped(doc, sel, p, s)),
            ActiveQuery::Block(BlockType::Heading(level)) => {
                text::heading_level(&Self::current_line(engine)) == Some(level)
            }
            ActiveQuery::Block(BlockType::Blockquote) => text::is_quoted_line(&Self::current_line(engine)),
            ActiveQuery::Block(BlockType::Paragraph) => {
                let line = Self::current_line(engine);
                text::heading_level(&line).is_none()
                    && !text::is_quoted_line(&line)
                    && text::parse_list_marker(&line).is_none()
            }
            ActiveQuery::List(kind) => text::is_list_active(doc, sel, kind),
        }
    }

    fn undo(&mut self) -> bool {
        self.engine.as_deref_mut().is_some_and(|e| e.undo())
    }

    fn redo(&mut self) -> bool {
        self.engine.as_deref_mut().is_some_and(|e| e.redo())
    }

    fn can_undo(&self) -> bool {
        self.engine.as_deref().is_some_and(|e| e.can_undo())
    }

    fn can_redo(&self) -> bool {
        self.engine.as_deref().is_some_and(|e| e.can_redo())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::{EditConstraints, Selection};

    #[test]
    fn test_no_engine_is_noop() {
        let mut commands = CodeCommands::new(None);
        assert!(!commands.toggle_inline(InlineMark::Bold));
        assert!(!commands.toggle_list(ListKind::Task));
        assert!(!commands.continue_list());
        assert!(!commands.undo());
        assert!(!commands.can_undo());
        assert!(!commands.is_active(ActiveQuery::Mark(InlineMark::Bold)));
    }

    #[test]
    fn test_active_state_follows_edits() {
        let mut engine = CodeEngine::new("title", EditConstraints::multiline());
        engine.set_selection(Selection::cursor(2));
        let mut commands = CodeCommands::new(Some(&mut engine));

        assert!(commands.toggle_block(BlockType::Heading(2)));
        assert!(commands.is_active(ActiveQuery::Block(BlockType::Heading(2))));
        assert!(!commands.is_active(ActiveQuery::Block(BlockType::Paragraph)));
        assert!(commands.can_undo());
        assert!(!commands.can_redo());

        assert!(commands.toggle_block(BlockType::Paragraph));
        assert!(commands.is_active(ActiveQuery::Block(BlockType::Paragraph)));
        assert!(commands.undo());
        assert!(commands.can_redo());
        drop(commands);
        assert_eq!(engine.text(), "## title");
    }

    #[test]
    fn test_bold_active_inside_delimiters() {
        let mut engine = CodeEngine::new("**x**", EditConstraints::multiline());
        engine.set_selection(Selection::new(2, 3));
        let commands = CodeCommands::new(Some(&mut engine));
        assert!(commands.is_active(ActiveQuery::Mark(InlineMark::Bold)));
        assert!(!commands.is_active(ActiveQuery::Mark(InlineMark::Italic)));
    }
}
