//! Bucket Module
//!
//! A fixed shard of the key space: a key-to-entry map behind a shard-wide lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::cache::Entry;
use crate::error::{CacheError, Result};

type EntryMap = HashMap<String, Arc<Entry>>;

// == Bucket ==
/// One shard of the cache.
///
/// The bucket lock protects membership of the map only. Payload and expiration
/// of an entry are protected by the entry's own lock. A bucket whose map was
/// never initialized is invalid and every operation against it fails with
/// [`CacheError::BadCache`].
#[derive(Debug)]
pub struct Bucket {
    entries: RwLock<Option<EntryMap>>,
}

/// Outcome of [`Bucket::upsert`].
#[derive(Debug)]
pub enum Upsert {
    /// The key was absent and a fresh entry now holds the payload
    Inserted,
    /// The key was present; the caller must update the entry under its lock.
    /// The unused payload is handed back.
    Existing { entry: Arc<Entry>, data: Vec<u8> },
}

impl Bucket {
    // == Constructor ==
    /// Creates a valid, empty bucket.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Some(HashMap::new())),
        }
    }

    /// Creates a bucket whose map was never initialized.
    #[cfg(test)]
    pub(crate) fn uninitialized() -> Self {
        Self {
            entries: RwLock::new(None),
        }
    }

    // == Lookup ==
    /// Finds the entry for `key` under the shared bucket lock.
    ///
    /// The lock is released before returning; the entry is not locked.
    pub async fn lookup(&self, key: &str) -> Result<Option<Arc<Entry>>> {
        let guard = self.entries.read().await;
        let map = guard.as_ref().ok_or(CacheError::BadCache)?;
        Ok(map.get(key).cloned())
    }

    // == Upsert ==
    /// Inserts a new entry for `key` or hands back the existing one, under
    /// the exclusive bucket lock.
    pub async fn upsert(&self, key: &str, data: Vec<u8>, ttl: Duration) -> Result<Upsert> {
        let mut guard = self.entries.write().await;
        let map = guard.as_mut().ok_or(CacheError::BadCache)?;

        if let Some(existing) = map.get(key) {
            return Ok(Upsert::Existing {
                entry: Arc::clone(existing),
                data,
            });
        }

        map.insert(key.to_string(), Arc::new(Entry::new(key, data, ttl)));
        Ok(Upsert::Inserted)
    }

    // == Sweep Expired ==
    /// Removes entries expired at `now` and returns how many were removed.
    ///
    /// Entries whose lock is currently held are skipped until a later sweep.
    /// Removed entries are marked evicted so that a caller which looked one up
    /// before the removal retries instead of writing to an unlinked entry.
    pub async fn sweep_expired(&self, now: Instant) -> Result<usize> {
        let mut guard = self.entries.write().await;
        let map = guard.as_mut().ok_or(CacheError::BadCache)?;

        let before = map.len();
        map.retain(|_, entry| match entry.state.try_write() {
            Ok(mut state) if state.is_expired_at(now) => {
                state.evicted = true;
                false
            }
            _ => true,
        });

        Ok(before - map.len())
    }

    // == Length ==
    /// Number of entries in the map, expired or not.
    pub async fn len(&self) -> Result<usize> {
        let guard = self.entries.read().await;
        guard
            .as_ref()
            .map(HashMap::len)
            .ok_or(CacheError::BadCache)
    }

    /// Returns true if the map holds no entries.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

impl Default for Bucket {
    fn default() -> Self {
        Self::new()
    }
}
