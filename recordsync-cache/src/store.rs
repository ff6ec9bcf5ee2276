use crate::Aggregate;
use recordsync_types::{QueryKey, SubKey, Timestamp};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Buffered change notifications per subscriber before it starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One cached aggregate and its bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    aggregate: Aggregate,
    fetched_at: Timestamp,
    revision: u64,
}

impl CacheEntry {
    /// The cached aggregate.
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// When the aggregate was last fetched. Patches do not move this.
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Incremented by every write to this key, starting at 1.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Time since the last fetch.
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// Whether the last fetch is older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}

/// A change applied to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// First fetch of a key.
    Populated { key: QueryKey, revision: u64 },
    /// Explicit refetch replaced a key's aggregate.
    Replaced { key: QueryKey, revision: u64 },
    /// One sub-key of a key's aggregate was replaced.
    Patched {
        key: QueryKey,
        sub_key: SubKey,
        revision: u64,
    },
}

/// Shared handle to the page's aggregate cache.
///
/// Cloning the handle shares the underlying store.
#[derive(Debug, Clone)]
pub struct CacheStore {
    entries: Arc<RwLock<HashMap<QueryKey, Arc<CacheEntry>>>>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    // Entries are replaced whole, so a panic elsewhere cannot leave one half-written.
    fn entries(&self) -> RwLockReadGuard<'_, HashMap<QueryKey, Arc<CacheEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries_mut(&self) -> RwLockWriteGuard<'_, HashMap<QueryKey, Arc<CacheEntry>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: CacheEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    /// Snapshot of the entry for `key`.
    pub fn read(&self, key: &QueryKey) -> Option<Arc<CacheEntry>> {
        self.entries().get(key).cloned()
    }

    /// Snapshot of one sub-object.
    pub fn read_section(&self, key: &QueryKey, sub_key: &SubKey) -> Option<Arc<Value>> {
        self.entries()
            .get(key)
            .and_then(|entry| entry.aggregate.get(sub_key).cloned())
    }

    /// Whether `key` has been fetched.
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries().contains_key(key)
    }

    /// Cached query keys.
    pub fn keys(&self) -> Vec<QueryKey> {
        self.entries().keys().cloned().collect()
    }

    /// Stores the result of a first fetch.
    ///
    /// A key is populated at most once: if it is already cached the existing
    /// entry is returned untouched. Use [`replace`](Self::replace) for an
    /// explicit refetch.
    pub fn populate(&self, key: QueryKey, aggregate: Aggregate) -> Arc<CacheEntry> {
        let mut entries = self.entries_mut();
        if let Some(existing) = entries.get(&key) {
            debug!("Cache key {} already populated, keeping revision {}", key, existing.revision);
            return existing.clone();
        }
        let entry = Arc::new(CacheEntry {
            aggregate,
            fetched_at: Timestamp::now(),
            revision: 1,
        });
        entries.insert(key.clone(), entry.clone());
        drop(entries);

        info!("Populated cache key {} ({} sections)", key, entry.aggregate.len());
        self.notify(CacheEvent::Populated { key, revision: 1 });
        entry
    }

    /// Wholesale replacement after an explicit refetch.
    pub fn replace(&self, key: QueryKey, aggregate: Aggregate) -> Arc<CacheEntry> {
        let mut entries = self.entries_mut();
        let revision = entries.get(&key).map_or(1, |e| e.revision + 1);
        let entry = Arc::new(CacheEntry {
            aggregate,
            fetched_at: Timestamp::now(),
            revision,
        });
        entries.insert(key.clone(), entry.clone());
        drop(entries);

        info!("Replaced cache key {} at revision {}", key, revision);
        self.notify(CacheEvent::Replaced { key, revision });
        entry
    }

    /// Replaces one sub-object of a cached aggregate.
    ///
    /// Siblings of `sub_key` are carried over by reference. The new entry
    /// becomes visible to readers in a single swap. Returns `None`, leaving
    /// the cache unchanged, when `key` has not been fetched.
    pub fn patch(&self, key: &QueryKey, sub_key: &SubKey, value: Value) -> Option<Arc<CacheEntry>> {
        let mut entries = self.entries_mut();
        let Some(current) = entries.get(key) else {
            debug!("Skipping patch of {}.{}: key not cached", key, sub_key);
            return None;
        };
        let entry = Arc::new(CacheEntry {
            aggregate: current.aggregate.with_section(sub_key.clone(), value),
            fetched_at: current.fetched_at,
            revision: current.revision + 1,
        });
        entries.insert(key.clone(), entry.clone());
        drop(entries);

        debug!("Patched {}.{} at revision {}", key, sub_key, entry.revision);
        self.notify(CacheEvent::Patched {
            key: key.clone(),
            sub_key: sub_key.clone(),
            revision: entry.revision,
        });
        Some(entry)
    }

    /// Subscribes to changes made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }
}
