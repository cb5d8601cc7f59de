//! Shard Cache - an in-process sharded key-value cache
//!
//! Keys are routed to a fixed number of buckets by hash. Each bucket guards
//! its membership with its own lock and each entry guards its payload and
//! expiration with another, so unrelated keys rarely contend. Entries expire
//! lazily on read and are unlinked by a background sweeper owned by the cache.
//!
//! Multi-step read-modify-write sequences run through
//! [`ShardedCache::safe_operate`], which holds the entry's exclusive lock and
//! hands the callback a [`NoLock`](cache::NoLock) handle for unlocked access.
//!
//! ```ignore
//! let cache = ShardedCache::new(64)?;
//! cache.set("hits", b"0".to_vec(), Duration::from_secs(60)).await?;
//! cache
//!     .safe_operate("hits", |view| {
//!         let n: u64 = String::from_utf8_lossy(&view.nl_get("hits")?).parse().unwrap_or(0);
//!         view.nl_set("hits", (n + 1).to_string().into_bytes(), Duration::from_secs(60))
//!     })
//!     .await?;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::ShardedCache;
pub use config::Config;
pub use error::{CacheError, Result};
