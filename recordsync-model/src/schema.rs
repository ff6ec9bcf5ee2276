use crate::rule::RecordRule;
use crate::{ProviderConfig, ProviderKind, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Describes the shape of one section's record.
#[derive(Clone)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldRule>,
    rules: Vec<Arc<dyn RecordRule>>,
}

impl RecordSchema {
    /// Creates a schema from its field rules.
    pub fn new(name: impl Into<String>, fields: Vec<FieldRule>) -> Self {
        Self {
            name: name.into(),
            fields,
            rules: Vec::new(),
        }
    }

    /// Attaches a cross-field rule, evaluated after the per-field rules.
    pub fn with_rule(mut self, rule: Arc<dyn RecordRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Cross-field rules in attachment order.
    pub fn rules(&self) -> &[Arc<dyn RecordRule>] {
        &self.rules
    }

    /// Looks up the rule for a field path.
    pub fn field(&self, path: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.field_path == path)
    }

    /// Blank form values shown before the first fetch completes.
    pub fn default_record(&self) -> Record {
        let mut record = Record::new();
        for field in &self.fields {
            // A malformed declared path gets no default.
            let _ = record.set_path(&field.field_path, field.default_value());
        }
        record
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Validation rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Dotted field path (e.g., "title", "gateway").
    pub field_path: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Minimum length in characters. Only meaningful for textual fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    /// Maximum length in characters. Only meaningful for textual fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    /// Allowed values. Only meaningful when FieldType is Enum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "options")]
    pub enum_options: Option<Vec<String>>,
    /// Provider whose blank config is used as the default value.
    /// Only meaningful when FieldType is ProviderConfig.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
}

impl FieldRule {
    fn simple(path: &str, field_type: FieldType) -> Self {
        Self {
            field_path: path.into(),
            field_type,
            required: true,
            min_len: None,
            max_len: None,
            enum_options: None,
            provider: None,
        }
    }

    /// Shorthand for a plain text field.
    pub fn text(path: &str) -> Self {
        Self::simple(path, FieldType::Text)
    }

    /// Shorthand for a rich text (HTML) field.
    pub fn rich_text(path: &str) -> Self {
        Self::simple(path, FieldType::RichText)
    }

    /// Shorthand for a numeric field.
    pub fn number(path: &str) -> Self {
        Self::simple(path, FieldType::Number)
    }

    /// Shorthand for a boolean field.
    pub fn bool(path: &str) -> Self {
        Self::simple(path, FieldType::Bool)
    }

    /// Shorthand for an uploaded-file reference.
    pub fn file_ref(path: &str) -> Self {
        Self::simple(path, FieldType::FileRef)
    }

    /// Shorthand for an enum field with fixed options.
    pub fn enumeration(path: &str, options: Vec<String>) -> Self {
        Self {
            enum_options: Some(options),
            ..Self::simple(path, FieldType::Enum)
        }
    }

    /// Shorthand for a provider configuration block.
    pub fn provider_config(path: &str, default_provider: ProviderKind) -> Self {
        Self {
            provider: Some(default_provider),
            ..Self::simple(path, FieldType::ProviderConfig)
        }
    }

    /// Marks the field as required (the default).
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the minimum length in characters.
    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    /// Sets the maximum length in characters.
    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// The value a blank form starts with.
    pub fn default_value(&self) -> Value {
        match self.field_type {
            FieldType::Text | FieldType::RichText | FieldType::FileRef | FieldType::Enum => {
                Value::String(String::new())
            }
            FieldType::Number => Value::from(0),
            FieldType::Bool => Value::Bool(false),
            FieldType::ProviderConfig => self
                .provider
                .map(ProviderConfig::blank)
                .and_then(|config| serde_json::to_value(config).ok())
                .unwrap_or(Value::Null),
        }
    }
}

/// The declared type of a field.
///
/// Rich text and file references are validated in the value type their
/// widgets produce, so no secondary representation of those fields exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    RichText,
    Number,
    Bool,
    Enum,
    FileRef,
    ProviderConfig,
}
