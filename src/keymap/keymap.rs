//! Keybinding storage and lookup

use std::collections::HashMap;

use super::binding::Keybinding;
use super::command::Command;
use super::context::{Condition, KeyContext};
use super::types::Keystroke;

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<Keybinding>,
    /// Indices into `bindings`; several bindings may share a keystroke with
    /// different conditions
    lookup: HashMap<Keystroke, Vec<usize>>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: Vec<Keybinding>) -> Self {
        let mut keymap = Self::new();
        for binding in bindings {
            keymap.add_binding(binding);
        }
        keymap
    }

    pub fn add_binding(&mut self, binding: Keybinding) {
        if binding.command == Command::Unbound {
            return;
        }
        let idx = self.bindings.len();
        self.lookup.entry(binding.keystroke).or_default().push(idx);
        self.bindings.push(binding);
    }

    pub fn bindings(&self) -> &[Keybinding] {
        &self.bindings
    }

    /// Finds the command for a keystroke in the given context.
    ///
    /// Conditional bindings win over unconditional ones; within each group
    /// the first registered binding wins.
    pub fn lookup(&self, keystroke: &Keystroke, ctx: &KeyContext) -> Option<Command> {
        let indices = self.lookup.get(keystroke)?;

        let conditional = indices.iter().find_map(|&idx| {
            let binding = &self.bindings[idx];
            let conditions = binding.when.as_ref()?;
            Condition::evaluate_all(conditions, ctx).then_some(binding.command)
        });

        conditional.or_else(|| {
            indices
                .iter()
                .map(|&idx| &self.bindings[idx])
                .find(|b| b.when.is_none())
                .map(|b| b.command)
        })
    }

    /// First keystroke bound to a command, for tooltips
    pub fn binding_for(&self, command: Command) -> Option<&Keybinding> {
        self.bindings.iter().find(|b| b.command == command)
    }

    pub fn display_for(&self, command: Command) -> Option<String> {
        self.binding_for(command).map(Keybinding::display_string)
    }
}
