//! Error types for remote calls.

use recordsync_model::ValidationError;
use thiserror::Error;

/// Result type for remote calls.
pub type RpcResult<T> = Result<T, RpcError>;

/// A failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The server rejected the payload field by field.
    #[error("server rejected {} field(s)", .fields.len())]
    Validation { fields: Vec<ValidationError> },

    /// The call did not produce a usable answer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RpcError {
    /// Whether the error belongs next to specific fields rather than in a
    /// session-level banner.
    pub fn is_field_scoped(&self) -> bool {
        matches!(self, RpcError::Validation { .. })
    }

    /// Field errors of a validation rejection; empty otherwise.
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            RpcError::Validation { fields } => fields,
            RpcError::Transport(_) => &[],
        }
    }

    /// The transport failure, if this is one.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            RpcError::Transport(e) => Some(e),
            RpcError::Validation { .. } => None,
        }
    }
}

/// A failure that is not attributable to any field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// No answer arrived in time.
    #[error("request timed out")]
    Timeout,

    /// The server answered with an unexpected failure.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The record was changed by someone else since it was fetched.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The server's answer could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}
