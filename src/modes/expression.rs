//! Expression mode: the configuration follows the field's declared type,
//! and the user can switch the primary input mode.

use crate::chip::ChipEditor;
use crate::codec::{ModeConfig, PrimaryMode};
use crate::commands::{Cmd, EditorId};
use crate::config::EditorConfig;
use crate::field::{FieldType, FormField};

use super::{chip_for, ModeProps};

#[derive(Debug)]
pub struct ExpressionMode {
    chip: ChipEditor,
    field_type: FieldType,
}

impl ExpressionMode {
    pub fn new(id: EditorId, props: &ModeProps, settings: &EditorConfig) -> Self {
        Self {
            chip: chip_for(id, ModeConfig::for_field(&props.field), props, settings),
            field_type: props.field.value_type,
        }
    }

    pub fn chip(&self) -> &ChipEditor {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipEditor {
        &mut self.chip
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Swap configurations when the field's type changed
    pub fn set_field(&mut self, field: &FormField) -> Option<Cmd> {
        if field.value_type == self.field_type {
            return None;
        }
        tracing::debug!(
            editor = self.chip.id().0,
            from = ?self.field_type,
            to = ?field.value_type,
            "field type changed"
        );
        self.field_type = field.value_type;
        self.chip.set_config(ModeConfig::for_field(field))
    }

    /// User picked a different primary mode
    pub fn set_primary_mode(&mut self, mode: PrimaryMode) -> Option<Cmd> {
        self.chip.set_config(ModeConfig::for_primary_mode(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ConfigKind;

    #[test]
    fn test_field_type_change_swaps_config() {
        let props = ModeProps::new(FormField::new("q", FieldType::Expression), "1");
        let mut mode = ExpressionMode::new(EditorId(1), &props, &EditorConfig::default());
        assert_eq!(mode.chip().config().kind, ConfigKind::Plain);

        mode.set_field(&FormField::new("q", FieldType::RawTemplate));
        assert_eq!(mode.chip().config().kind, ConfigKind::RawTemplate);
        assert_eq!(mode.field_type(), FieldType::RawTemplate);

        // Same type again is a no-op
        assert_eq!(mode.set_field(&FormField::new("q", FieldType::RawTemplate)), None);
    }
}
