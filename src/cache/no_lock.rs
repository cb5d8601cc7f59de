//! No-Lock Access
//!
//! Unlocked reads and writes against an entry whose exclusive lock is already
//! held by [`ShardedCache::safe_operate`](crate::cache::ShardedCache::safe_operate).

use std::time::Duration;

use crate::cache::entry::EntryState;
use crate::cache::stats::StatsRecorder;
use crate::error::{CacheError, Result};

// == No-Lock Handle ==
/// Capability handle for one locked entry.
///
/// Only `safe_operate` can build a `NoLock`, and it does so while holding the
/// entry's exclusive lock for the whole lifetime of the handle. The `nl_*`
/// methods therefore take no bucket or entry locks. Calling the locking
/// `get`/`set` for the same key from inside the callback would deadlock; use
/// these methods instead.
///
/// The handle is scoped to the locked key. Any other key is rejected with
/// [`CacheError::NotLocked`].
#[derive(Debug)]
pub struct NoLock<'a> {
    key: &'a str,
    state: &'a mut EntryState,
    stats: &'a StatsRecorder,
}

impl<'a> NoLock<'a> {
    pub(crate) fn new(key: &'a str, state: &'a mut EntryState, stats: &'a StatsRecorder) -> Self {
        Self { key, state, stats }
    }

    /// The key whose lock this handle holds.
    pub fn key(&self) -> &str {
        self.key
    }

    fn ensure_locked(&self, key: &str) -> Result<()> {
        if key == self.key {
            Ok(())
        } else {
            Err(CacheError::NotLocked(key.to_string()))
        }
    }

    // == NL Get ==
    /// Reads the payload with the same expiry rules as `get`.
    pub fn nl_get(&self, key: &str) -> Result<Vec<u8>> {
        self.ensure_locked(key)?;
        if self.state.is_expired() {
            self.stats.record_miss();
            return Err(CacheError::RecordNotFound(key.to_string()));
        }
        self.stats.record_hit();
        Ok(self.state.data.clone())
    }

    // == NL Set ==
    /// Replaces payload and expiration with the same rules as `set`.
    pub fn nl_set(&mut self, key: &str, data: Vec<u8>, ttl: Duration) -> Result<()> {
        self.ensure_locked(key)?;
        self.state.refresh(data, ttl);
        Ok(())
    }

    // == NL TTL ==
    /// Remaining lifetime in milliseconds.
    ///
    /// Fails with `NoExpireTime` when the entry never expires and with
    /// `RecordNotFound` when it already has.
    pub fn nl_ttl(&self, key: &str) -> Result<u64> {
        self.ensure_locked(key)?;
        let remaining = self
            .state
            .ttl_remaining()
            .ok_or_else(|| CacheError::NoExpireTime(key.to_string()))?;
        if self.state.is_expired() {
            return Err(CacheError::RecordNotFound(key.to_string()));
        }
        Ok(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_nl_get_and_set() {
        let stats = StatsRecorder::new();
        let mut state = EntryState::new(b"1".to_vec(), Duration::from_secs(60));
        let mut view = NoLock::new("k", &mut state, &stats);

        assert_eq!(view.key(), "k");
        assert_eq!(view.nl_get("k").unwrap(), b"1");
        view.nl_set("k", b"2".to_vec(), Duration::from_secs(60)).unwrap();
        assert_eq!(view.nl_get("k").unwrap(), b"2");

        assert_eq!(stats.snapshot(0).hits, 2);
    }

    #[test]
    fn test_other_key_is_rejected() {
        let stats = StatsRecorder::new();
        let mut state = EntryState::new(b"1".to_vec(), Duration::from_secs(60));
        let mut view = NoLock::new("k", &mut state, &stats);

        assert_eq!(
            view.nl_get("other").unwrap_err(),
            CacheError::NotLocked("other".to_string())
        );
        assert!(view
            .nl_set("other", Vec::new(), Duration::from_secs(1))
            .is_err());
        assert!(view.nl_ttl("other").is_err());
        assert_eq!(view.nl_get("k").unwrap(), b"1");
    }

    #[test]
    fn test_nl_get_expired() {
        let stats = StatsRecorder::new();
        let mut state = EntryState::new(b"1".to_vec(), Duration::from_millis(1));
        sleep(Duration::from_millis(5));
        let view = NoLock::new("k", &mut state, &stats);

        assert_eq!(
            view.nl_get("k").unwrap_err(),
            CacheError::RecordNotFound("k".to_string())
        );
        assert_eq!(stats.snapshot(0).misses, 1);
    }

    #[test]
    fn test_nl_ttl() {
        let stats = StatsRecorder::new();
        let mut state = EntryState::new(b"1".to_vec(), Duration::from_secs(10));
        let view = NoLock::new("k", &mut state, &stats);

        let remaining = view.nl_ttl("k").unwrap();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_nl_ttl_without_expiration() {
        let stats = StatsRecorder::new();
        let mut state = EntryState::new(b"1".to_vec(), Duration::MAX);
        let view = NoLock::new("k", &mut state, &stats);

        assert_eq!(
            view.nl_ttl("k").unwrap_err(),
            CacheError::NoExpireTime("k".to_string())
        );
    }

    #[test]
    fn test_nl_ttl_expired() {
        let stats = StatsRecorder::new();
        let mut state = EntryState::new(b"1".to_vec(), Duration::from_millis(1));
        sleep(Duration::from_millis(5));
        let view = NoLock::new("k", &mut state, &stats);

        assert_eq!(
            view.nl_ttl("k").unwrap_err(),
            CacheError::RecordNotFound("k".to_string())
        );
    }

    #[test]
    fn test_nl_set_revives_expired() {
        let stats = StatsRecorder::new();
        let mut state = EntryState::new(b"old".to_vec(), Duration::from_millis(1));
        sleep(Duration::from_millis(5));
        let mut view = NoLock::new("k", &mut state, &stats);

        view.nl_set("k", b"new".to_vec(), Duration::from_secs(60)).unwrap();
        assert_eq!(view.nl_get("k").unwrap(), b"new");
    }
}
