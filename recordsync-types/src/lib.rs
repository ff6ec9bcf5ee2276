//! Core type definitions for recordsync.
//!
//! This crate defines the identifiers and clock shared by every layer of the
//! editable-record controller:
//! - Query keys that name a cached aggregate, and sub-keys that name one
//!   section inside it
//! - Session identifiers (UUID v7) used to tag log output
//! - Wall-clock timestamps for cache freshness
//!
//! Record payloads and schemas live in `recordsync-model`, not here.

mod ids;
mod timestamp;

pub use ids::{QueryKey, SessionId, SubKey};
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid query key: {0}")]
    InvalidQueryKey(String),

    #[error("invalid sub-key: {0}")]
    InvalidSubKey(String),
}
