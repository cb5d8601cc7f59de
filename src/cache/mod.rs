//! Cache Module
//!
//! Sharded in-memory storage with per-bucket and per-entry locking, lazy TTL
//! expiration and a background sweeper.

mod bucket;
mod engine;
mod entry;
mod no_lock;
pub mod routing;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use bucket::{Bucket, Upsert};
pub(crate) use engine::Shards;
pub use engine::ShardedCache;
pub use entry::{Entry, EntryState};
pub use no_lock::NoLock;
pub use routing::{bucket_index, fnv1_32};
pub use stats::{CacheStats, StatsRecorder};

use std::time::Duration;

// == Public Constants ==
/// Default period of the background sweeper
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
