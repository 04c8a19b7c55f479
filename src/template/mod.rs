//! Markdown-aware editing commands over two engines.
//!
//! Mode components only see [`StructuredEditing`]. [`CodeCommands`] drives
//! the plain-text [`crate::editable::CodeEngine`] by rewriting markdown
//! source; [`RichCommands`] drives the structured [`rich::RichEditor`] by
//! editing nodes and marks. The same logical command toggles the same
//! construct in both.

mod code;
pub mod markdown;
pub mod rich;
pub mod text;

pub use code::CodeCommands;
pub use rich::RichCommands;

/// Inline formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineMark {
    Bold,
    Italic,
    Link,
}

impl InlineMark {
    /// Markdown delimiter pair for wrap-style marks
    pub fn delimiters(self) -> Option<(&'static str, &'static str)> {
        match self {
            InlineMark::Bold => Some(("**", "**")),
            InlineMark::Italic => Some(("_", "_")),
            InlineMark::Link => None,
        }
    }
}

/// Block-level constructs other than lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    /// Level 1-6
    Heading(u8),
    Blockquote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Unordered,
    Ordered,
    Task,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Unordered, ListKind::Ordered, ListKind::Task];
}

/// What a toolbar button asks to highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveQuery {
    Mark(InlineMark),
    Block(BlockType),
    List(ListKind),
}

/// Editing capability shared by both engines.
///
/// Every method is a no-op returning `false` when no engine is attached.
pub trait StructuredEditing {
    fn toggle_inline(&mut self, mark: InlineMark) -> bool;

    /// Toggle a link over the selection. Engines that need a target return
    /// `false` without one.
    fn toggle_link(&mut self, href: Option<&str>) -> bool;

    fn toggle_block(&mut self, block: BlockType) -> bool;

    fn toggle_list(&mut self, kind: ListKind) -> bool;

    /// Enter inside a list item. `false` lets the host fall through to a
    /// plain newline.
    fn continue_list(&mut self) -> bool;

    fn is_active(&self, query: ActiveQuery) -> bool;

    fn undo(&mut self) -> bool;
    fn redo(&mut self) -> bool;
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
}
