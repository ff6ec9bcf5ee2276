//! Error types for the record model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when reading or writing record structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A record must be a JSON object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// A field path was empty or had an empty segment.
    #[error("invalid field path: {0:?}")]
    InvalidPath(String),

    /// A write tried to descend through a value that is not an object.
    #[error("cannot write through non-object value at {0}")]
    NotAnObjectAt(String),
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
