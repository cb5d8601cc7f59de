//! Cache Entry Module
//!
//! Defines a single cached key: payload and expiration behind the entry's own lock.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

// == Entry ==
/// One cached key.
///
/// The payload and expiration live behind a lock owned by the entry, so
/// readers and writers of one entry never hold up membership changes on the
/// rest of its bucket.
#[derive(Debug)]
pub struct Entry {
    /// Original key, kept for verification
    key: String,
    /// Guarded payload and expiration
    pub(crate) state: RwLock<EntryState>,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    pub fn new(key: impl Into<String>, data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            state: RwLock::new(EntryState::new(data, ttl)),
        }
    }

    /// Returns the key this entry was created for.
    pub fn key(&self) -> &str {
        &self.key
    }
}

// == Entry State ==
/// Lock-guarded part of an entry.
#[derive(Debug, Clone)]
pub struct EntryState {
    /// Opaque payload
    pub data: Vec<u8>,
    /// Expiration instant, None = never expires
    pub expire_at: Option<Instant>,
    /// Set by the sweeper when the entry has been unlinked from its bucket
    pub(crate) evicted: bool,
}

impl EntryState {
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expire_at: expire_at(ttl),
            evicted: false,
        }
    }

    // == Refresh ==
    /// Replaces payload and expiration, reviving an expired entry.
    pub fn refresh(&mut self, data: Vec<u8>, ttl: Duration) {
        self.data = data;
        self.expire_at = expire_at(ttl);
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// An entry is expired once `now >= expire_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expire_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// Saturates at zero once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expire_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

/// Absolute expiration for `ttl` from now; None when the instant overflows.
fn expire_at(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}
