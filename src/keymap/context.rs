//! Context for conditional keybindings

/// Editor state consulted by `when` conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyContext {
    pub has_selection: bool,
    pub in_list_item: bool,
    pub helper_open: bool,
    /// Link dialog or another modal owns the keyboard
    pub dialog_open: bool,
    /// Rich (structured) view rather than raw markdown
    pub rich_view: bool,
}

/// A condition that must hold for a binding to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    HasSelection,
    NoSelection,
    InListItem,
    HelperOpen,
    DialogOpen,
    DialogClosed,
    RichView,
    RawView,
}

impl Condition {
    pub fn evaluate(self, ctx: &KeyContext) -> bool {
        match self {
            Condition::HasSelection => ctx.has_selection,
            Condition::NoSelection => !ctx.has_selection,
            Condition::InListItem => ctx.in_list_item,
            Condition::HelperOpen => ctx.helper_open,
            Condition::DialogOpen => ctx.dialog_open,
            Condition::DialogClosed => !ctx.dialog_open,
            Condition::RichView => ctx.rich_view,
            Condition::RawView => !ctx.rich_view,
        }
    }

    /// AND over all conditions
    pub fn evaluate_all(conditions: &[Condition], ctx: &KeyContext) -> bool {
        conditions.iter().all(|c| c.evaluate(ctx))
    }
}
