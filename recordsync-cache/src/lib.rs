//! Client-side cache of fetched aggregates.
//!
//! An aggregate is the object a page's read query returns: one sub-object
//! per editable section, addressed by [`SubKey`](recordsync_types::SubKey).
//! The cache is shared by every edit session on a page and is passed to
//! each session explicitly as a [`CacheStore`] handle.
//!
//! # Consistency
//!
//! Entries are immutable snapshots behind `Arc`. Writers build a new
//! snapshot and swap it in under the store's lock, so a reader holding an
//! entry never observes a half-applied write. A sub-key patch shares every
//! untouched sub-object with the previous snapshot, so siblings stay
//! pointer-equal as well as deep-equal.

mod aggregate;
mod error;
mod store;

pub use aggregate::Aggregate;
pub use error::{CacheError, CacheResult};
pub use store::{CacheEntry, CacheEvent, CacheStore, EVENT_CHANNEL_CAPACITY};
