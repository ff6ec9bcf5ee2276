//! Error types for edit sessions.

use crate::SessionState;
use recordsync_cache::CacheError;
use recordsync_model::{ModelError, ValidationError};
use recordsync_rpc::{RpcError, TransportError};
use thiserror::Error;

/// Result type for session operations other than submit.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from session transitions, field writes and loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The operation is not allowed in the current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },

    /// A field write or a fetched section had the wrong structure.
    #[error(transparent)]
    Record(#[from] ModelError),

    /// Fetching the aggregate failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] RpcError),

    /// The fetched aggregate could not be cached.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Why a submission did not persist the draft.
///
/// Every variant leaves the session in `Editing` with the draft unchanged,
/// except `InvalidState`, which leaves the state as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The draft failed schema validation; nothing was sent.
    #[error("{} field(s) failed validation", .0.len())]
    ClientValidation(Vec<ValidationError>),

    /// The server re-validated the payload and rejected fields.
    #[error("server rejected {} field(s)", .0.len())]
    ServerValidation(Vec<ValidationError>),

    /// The call failed without a field-level answer.
    #[error(transparent)]
    Transport(TransportError),

    /// Submit was called outside `Editing`.
    #[error("cannot submit while {state}")]
    InvalidState { state: SessionState },
}

impl SubmitError {
    /// Field errors to show inline; empty for banner-level failures.
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            SubmitError::ClientValidation(errors) | SubmitError::ServerValidation(errors) => errors,
            SubmitError::Transport(_) | SubmitError::InvalidState { .. } => &[],
        }
    }
}
