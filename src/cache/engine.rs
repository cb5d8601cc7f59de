//! Sharded Cache Engine
//!
//! Routes keys to buckets, implements the locking get/set, the `safe_operate`
//! escape hatch, and owns the background sweeper.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::cache::bucket::{Bucket, Upsert};
use crate::cache::routing::bucket_index;
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::cache::{NoLock, DEFAULT_SWEEP_INTERVAL};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweeper;

// == Shards ==
/// Bucket storage and counters, shared between the cache and its sweeper.
#[derive(Debug)]
pub(crate) struct Shards {
    buckets: Box<[Bucket]>,
    stats: StatsRecorder,
}

impl Shards {
    fn new(bucket_depth: usize) -> Result<Self> {
        if bucket_depth == 0 {
            return Err(CacheError::InvalidDepth(bucket_depth));
        }
        Ok(Self::from_buckets((0..bucket_depth).map(|_| Bucket::new()).collect()))
    }

    fn from_buckets(buckets: Vec<Bucket>) -> Self {
        Self {
            buckets: buckets.into_boxed_slice(),
            stats: StatsRecorder::new(),
        }
    }

    fn depth(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, key: &str) -> Result<&Bucket> {
        let depth = self.depth();
        let index = bucket_index(key, depth);
        self.buckets
            .get(index)
            .ok_or(CacheError::WrongBucketHash { index, depth })
    }

    /// Sweeps every bucket in turn, holding one bucket lock at a time.
    pub(crate) async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for bucket in self.buckets.iter() {
            if let Ok(count) = bucket.sweep_expired(now).await {
                removed += count;
            }
        }
        self.stats.record_evictions(removed);
        removed
    }

    async fn len(&self) -> usize {
        let mut total = 0;
        for bucket in self.buckets.iter() {
            total += bucket.len().await.unwrap_or(0);
        }
        total
    }
}

// == Sharded Cache ==
/// In-process key-value cache split into a fixed number of buckets.
///
/// Lock order is always bucket, then entry, and the bucket lock is released
/// before the entry lock is taken. Expired entries read as absent; the
/// background sweeper unlinks them so memory does not grow with keys that are
/// never read again. The sweeper is stopped by [`close`](Self::close) or when
/// the cache is dropped.
#[derive(Debug)]
pub struct ShardedCache {
    shards: Arc<Shards>,
    sweeper: Option<JoinHandle<()>>,
}

impl ShardedCache {
    // == Constructors ==
    /// Creates a cache with `bucket_depth` buckets and the default sweep interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(bucket_depth: usize) -> Result<Self> {
        Self::with_sweep_interval(bucket_depth, DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates a cache whose sweeper runs every `sweep_interval`.
    pub fn with_sweep_interval(bucket_depth: usize, sweep_interval: Duration) -> Result<Self> {
        let shards = Arc::new(Shards::new(bucket_depth)?);
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let sweeper = spawn_sweeper(&runtime, Arc::downgrade(&shards), sweep_interval);

        Ok(Self {
            shards,
            sweeper: Some(sweeper),
        })
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_sweep_interval(config.bucket_depth, config.sweep_interval())
    }

    /// Builds a cache over the given buckets without a sweeper.
    #[cfg(test)]
    pub(crate) fn from_buckets(buckets: Vec<Bucket>) -> Self {
        Self {
            shards: Arc::new(Shards::from_buckets(buckets)),
            sweeper: None,
        }
    }

    // == Routing ==
    /// Number of buckets, fixed at construction.
    pub fn bucket_depth(&self) -> usize {
        self.shards.depth()
    }

    /// Index of the bucket that owns `key`.
    pub fn bucket_index(&self, key: &str) -> usize {
        bucket_index(key, self.shards.depth())
    }

    // == Get ==
    /// Returns the payload for `key`.
    ///
    /// Absent and expired keys both fail with `RecordNotFound`.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let bucket = self.shards.bucket(key)?;
        let Some(entry) = bucket.lookup(key).await? else {
            return Err(self.miss(key));
        };

        let state = entry.state.read().await;
        if state.evicted || state.is_expired() {
            return Err(self.miss(key));
        }
        self.shards.stats.record_hit();
        Ok(state.data.clone())
    }

    // == Set ==
    /// Stores `data` under `key`, expiring `ttl` from now.
    ///
    /// An existing entry is updated in place, whether or not it had expired.
    /// A TTL too large to represent (such as `Duration::MAX`) never expires.
    pub async fn set(&self, key: &str, data: Vec<u8>, ttl: Duration) -> Result<()> {
        let bucket = self.shards.bucket(key)?;
        let mut data = data;
        loop {
            match bucket.upsert(key, data, ttl).await? {
                Upsert::Inserted => return Ok(()),
                Upsert::Existing {
                    entry,
                    data: payload,
                } => {
                    let mut state = entry.state.write().await;
                    if state.evicted {
                        // unlinked by the sweeper after the lookup
                        data = payload;
                        continue;
                    }
                    state.refresh(payload, ttl);
                    return Ok(());
                }
            }
        }
    }

    // == Safe Operate ==
    /// Runs `f` while holding the exclusive lock of `key`'s entry.
    ///
    /// `f` receives a [`NoLock`] handle for unlocked reads and writes of that
    /// entry, so read-modify-write sequences are atomic with respect to every
    /// other `get`, `set` and `safe_operate` on the same key. The lock is
    /// released when `f` returns, on success or error. Fails with
    /// `RecordNotFound` if the key is absent; an expired entry is still
    /// locked and handed to `f`, which can revive it with `nl_set`.
    pub async fn safe_operate<T, F>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut NoLock<'_>) -> Result<T>,
    {
        let bucket = self.shards.bucket(key)?;
        loop {
            let entry = bucket
                .lookup(key)
                .await?
                .ok_or_else(|| CacheError::RecordNotFound(key.to_string()))?;

            let mut state = entry.state.write().await;
            if state.evicted {
                continue;
            }

            let mut view = NoLock::new(entry.key(), &mut state, &self.shards.stats);
            return f(&mut view);
        }
    }

    // == Maintenance ==
    /// Removes expired entries from every bucket now.
    ///
    /// Returns the number of entries removed.
    pub async fn sweep_expired(&self) -> usize {
        self.shards.sweep_expired().await
    }

    /// Current number of entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.shards.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = self.len().await;
        self.shards.stats.snapshot(total_entries)
    }

    /// Whether the background sweeper is still running.
    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Close ==
    /// Stops the background sweeper. Stored entries stay readable.
    pub fn close(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }

    fn miss(&self, key: &str) -> CacheError {
        self.shards.stats.record_miss();
        CacheError::RecordNotFound(key.to_string())
    }
}

impl Drop for ShardedCache {
    fn drop(&mut self) {
        self.close();
    }
}
