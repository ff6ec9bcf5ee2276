//! Error types for the cache layer.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur when building cache values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The fetched aggregate was not a JSON object.
    #[error("aggregate must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// A key in the fetched aggregate is not a valid sub-key.
    #[error("invalid sub-key in aggregate: {0}")]
    InvalidSubKey(#[from] recordsync_types::Error),
}
