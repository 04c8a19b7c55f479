//! Text mode: a plain string field shown without its quotes

use crate::chip::ChipEditor;
use crate::codec::{ModeConfig, PrimaryMode};
use crate::commands::EditorId;
use crate::config::EditorConfig;

use super::{chip_for, ModeProps};

#[derive(Debug)]
pub struct TextMode {
    chip: ChipEditor,
}

impl TextMode {
    pub fn new(id: EditorId, props: &ModeProps, settings: &EditorConfig) -> Self {
        let config = ModeConfig::for_primary_mode(PrimaryMode::Text);
        Self {
            chip: chip_for(id, config, props, settings),
        }
    }

    pub fn chip(&self) -> &ChipEditor {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipEditor {
        &mut self.chip
    }
}
