//! The draft a form edits.
//!
//! Native inputs write one leaf path at a time. Rich text editors and file
//! pickers write through [`WidgetValue`], which is converted to the field's
//! single stored value in the same call; there is no second copy of the
//! field for the validator to read.

use recordsync_model::{ModelResult, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A completed upload as reported by a file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    /// Identifier (or URL) the record stores.
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// A value produced by a non-native widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetValue {
    /// HTML from a rich text editor.
    RichText(String),
    /// A finished upload.
    Upload(FileUpload),
    /// The user removed the uploaded file.
    ClearUpload,
}

impl WidgetValue {
    fn into_field_value(self) -> Value {
        match self {
            WidgetValue::RichText(html) => Value::String(html),
            WidgetValue::Upload(upload) => Value::String(upload.file_id),
            WidgetValue::ClearUpload => Value::String(String::new()),
        }
    }
}

/// Holds the mutable draft of one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBinder {
    draft: Record,
}

impl FieldBinder {
    pub fn new(record: Record) -> Self {
        Self { draft: record }
    }

    /// The current draft.
    pub fn get_values(&self) -> &Record {
        &self.draft
    }

    /// One field of the draft by dotted path.
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        self.draft.get(path)
    }

    /// Writes one field from a native input.
    pub fn set_value(&mut self, path: &str, value: impl Into<Value>) -> ModelResult<()> {
        self.draft.set_path(path, value.into())
    }

    /// Writes one field from a rich text editor or file picker.
    pub fn set_widget_value(&mut self, path: &str, value: WidgetValue) -> ModelResult<()> {
        self.draft.set_path(path, value.into_field_value())
    }

    /// Replaces the whole draft. The only wholesale overwrite.
    pub fn reset(&mut self, record: Record) {
        self.draft = record;
    }

    /// Whether the draft differs from `baseline`.
    pub fn is_dirty(&self, baseline: &Record) -> bool {
        &self.draft != baseline
    }
}
