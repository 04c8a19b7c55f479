//! Field metadata supplied by the host form.

use serde::{Deserialize, Serialize};

/// Declared value type of a form field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Expression,
    String,
    Template,
    RawTemplate,
    Sql,
    Number,
    Prompt,
}

/// Minimal form-field description every editor receives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormField {
    pub key: String,
    pub label: String,
    pub value_type: FieldType,
    pub optional: bool,
    pub placeholder: Option<String>,
    pub documentation: Option<String>,
}

impl FormField {
    pub fn new(key: impl Into<String>, value_type: FieldType) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            value_type,
            ..Self::default()
        }
    }
}
