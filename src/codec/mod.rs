//! Mode configurations: how a host value maps to the displayed text and back.
//!
//! A [`ModeConfig`] is a plain record built by one factory per mode. The
//! host owns the *deserialized* value (wrapper included); the editor shows
//! the *serialized* one (wrapper stripped).

pub mod sql;

use std::sync::OnceLock;

use regex::Regex;

use crate::chip::CompletionKind;
use crate::editable::EditConstraints;
use crate::field::{FieldType, FormField};

/// Inserted verbatim instead of being wrapped in `${...}`
pub const EMPTY_LITERAL_PLACEHOLDER: &str = "\"\"";

/// Extra editor behaviour a mode switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorExtension {
    /// SQL grammar highlighting
    SqlSyntax,
    /// Reject edits that leave a non-decimal document
    NumericInput,
}

/// Which configuration a record was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    Plain,
    StringTemplate,
    QuotedString,
    RawTemplate,
    SqlTemplate,
    Numeric,
}

/// Runtime-selected primary input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryMode {
    Expression,
    Text,
    Template,
    RawTemplate,
    Sql,
    Number,
}

#[derive(Debug, Clone)]
pub struct ModeConfig {
    pub kind: ConfigKind,
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub extensions: &'static [EditorExtension],
    compatible: fn(&str) -> bool,
}

impl PartialEq for ModeConfig {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for ModeConfig {}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::plain()
    }
}

fn any_value(_: &str) -> bool {
    true
}

fn decimal_regex() -> Option<&'static Regex> {
    static DECIMAL: OnceLock<Option<Regex>> = OnceLock::new();
    DECIMAL
        .get_or_init(|| Regex::new(r"^-?\d*\.?\d*$").ok())
        .as_ref()
}

/// Decimal-number predicate used by the numeric mode (empty and partial
/// input such as `-` or `1.` count as valid while typing)
pub fn is_decimal(value: &str) -> bool {
    decimal_regex().is_some_and(|re| re.is_match(value))
}

impl ModeConfig {
    /// No wrapper; values pass through unchanged
    pub fn plain() -> Self {
        Self {
            kind: ConfigKind::Plain,
            prefix: "",
            suffix: "",
            extensions: &[],
            compatible: any_value,
        }
    }

    /// `string `...`` string template
    pub fn string_template() -> Self {
        Self {
            kind: ConfigKind::StringTemplate,
            prefix: "string `",
            suffix: "`",
            ..Self::plain()
        }
    }

    /// Double-quoted string
    pub fn quoted_string() -> Self {
        Self {
            kind: ConfigKind::QuotedString,
            prefix: "\"",
            suffix: "\"",
            ..Self::plain()
        }
    }

    /// Backtick raw template
    pub fn raw_template() -> Self {
        Self {
            kind: ConfigKind::RawTemplate,
            prefix: "`",
            suffix: "`",
            ..Self::plain()
        }
    }

    /// Backtick SQL template with SQL highlighting
    pub fn sql_template() -> Self {
        Self {
            kind: ConfigKind::SqlTemplate,
            extensions: &[EditorExtension::SqlSyntax],
            ..Self::raw_template()
        }
    }

    /// Decimal numbers only
    pub fn numeric() -> Self {
        Self {
            kind: ConfigKind::Numeric,
            extensions: &[EditorExtension::NumericInput],
            compatible: is_decimal,
            ..Self::plain()
        }
    }

    pub fn for_primary_mode(mode: PrimaryMode) -> Self {
        match mode {
            PrimaryMode::Expression => Self::plain(),
            PrimaryMode::Text => Self::quoted_string(),
            PrimaryMode::Template => Self::string_template(),
            PrimaryMode::RawTemplate => Self::raw_template(),
            PrimaryMode::Sql => Self::sql_template(),
            PrimaryMode::Number => Self::numeric(),
        }
    }

    /// Configuration for a field's declared type
    pub fn for_field(field: &FormField) -> Self {
        let mode = match field.value_type {
            FieldType::Expression | FieldType::Prompt => PrimaryMode::Expression,
            FieldType::String => PrimaryMode::Text,
            FieldType::Template => PrimaryMode::Template,
            FieldType::RawTemplate => PrimaryMode::RawTemplate,
            FieldType::Sql => PrimaryMode::Sql,
            FieldType::Number => PrimaryMode::Number,
        };
        Self::for_primary_mode(mode)
    }

    pub fn has_extension(&self, extension: EditorExtension) -> bool {
        self.extensions.contains(&extension)
    }

    /// Prefix length in chars, used to shift tokenizer offsets
    pub fn prefix_len(&self) -> usize {
        self.prefix.chars().count()
    }

    fn is_wrapped(&self, value: &str) -> bool {
        !self.prefix.is_empty()
            && value.len() >= self.prefix.len() + self.suffix.len()
            && value.starts_with(self.prefix)
            && value.ends_with(self.suffix)
    }

    /// Host value to displayed text: strip the wrapper if present
    pub fn serialize(&self, value: &str) -> String {
        if self.is_wrapped(value) {
            value[self.prefix.len()..value.len() - self.suffix.len()].to_string()
        } else {
            value.to_string()
        }
    }

    /// Displayed text to host value: add the wrapper if absent
    pub fn deserialize(&self, value: &str) -> String {
        if self.prefix.is_empty() || self.is_wrapped(value) {
            value.to_string()
        } else {
            format!("{}{}{}", self.prefix, value, self.suffix)
        }
    }

    /// Text inserted for a chosen helper item
    pub fn helper_value(&self, value: &str, kind: Option<CompletionKind>) -> String {
        if kind == Some(CompletionKind::Function) || value == EMPTY_LITERAL_PLACEHOLDER {
            return value.to_string();
        }
        match self.kind {
            // Plain expressions and numbers take the raw reference
            ConfigKind::Plain | ConfigKind::Numeric => value.to_string(),
            _ => format!("${{{value}}}"),
        }
    }

    /// Whether a host value belongs to this configuration at all
    pub fn is_value_compatible(&self, value: &str) -> bool {
        (self.compatible)(&self.serialize(value))
    }

    /// Compatible form of an incompatible value: the longest valid prefix of
    /// its displayed text, re-wrapped
    pub fn correct_value(&self, value: &str) -> String {
        let shown = self.serialize(value);
        let mut end = 0;
        for (i, c) in shown.char_indices() {
            let next = i + c.len_utf8();
            if (self.compatible)(&shown[..next]) {
                end = next;
            } else {
                break;
            }
        }
        self.deserialize(&shown[..end])
    }

    /// Editing constraints for the engine
    pub fn constraints(&self, undo_depth: usize) -> EditConstraints {
        let constraints = if self.has_extension(EditorExtension::NumericInput) {
            EditConstraints::numeric(is_decimal)
        } else {
            EditConstraints::multiline()
        };
        constraints.with_undo_depth(undo_depth)
    }
}
