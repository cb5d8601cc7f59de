//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check routing and storage properties over generated keys.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{bucket_index, fnv1_32, Bucket, ShardedCache};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(3600);

// == Strategies ==
/// Generates arbitrary keys, including empty and non-ASCII ones
fn key_strategy() -> impl Strategy<Value = String> {
    any::<String>()
}

/// Generates payloads of arbitrary bytes
fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Builds a sweeper-less cache so timing never affects the properties
fn cache_with_depth(depth: usize) -> ShardedCache {
    ShardedCache::from_buckets((0..depth).map(|_| Bucket::new()).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Routing always lands inside the bucket range
    #[test]
    fn prop_bucket_index_in_range(key in key_strategy(), depth in 1usize..1024) {
        prop_assert!(bucket_index(&key, depth) < depth);
    }

    // Routing is a pure function of key and depth
    #[test]
    fn prop_bucket_index_stable(key in key_strategy(), depth in 1usize..1024) {
        let first = bucket_index(&key, depth);
        for _ in 0..8 {
            prop_assert_eq!(bucket_index(&key, depth), first);
        }
        prop_assert_eq!(first, fnv1_32(&key) as usize % depth);
    }

    // Extreme depths cannot push the index out of range
    #[test]
    fn prop_bucket_index_large_depth(key in key_strategy(), depth in (usize::MAX - 1024)..=usize::MAX) {
        prop_assert!(bucket_index(&key, depth) < depth);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Set followed by get returns the stored payload
    #[test]
    fn prop_roundtrip_storage(
        key in key_strategy(),
        payload in payload_strategy(),
        depth in 1usize..64
    ) {
        let rt = runtime();
        let cache = cache_with_depth(depth);

        let retrieved = rt.block_on(async {
            cache.set(&key, payload.clone(), TEST_TTL).await.unwrap();
            cache.get(&key).await
        });
        prop_assert_eq!(retrieved.unwrap(), payload);
    }

    // The last set for a key wins and every key keeps exactly one entry
    #[test]
    fn prop_last_write_wins(
        writes in prop::collection::vec((key_strategy(), payload_strategy()), 1..40),
        depth in 1usize..16
    ) {
        let rt = runtime();
        let cache = cache_with_depth(depth);

        let mut expected: HashMap<String, Vec<u8>> = HashMap::new();
        rt.block_on(async {
            for (key, payload) in &writes {
                cache.set(key, payload.clone(), TEST_TTL).await.unwrap();
                expected.insert(key.clone(), payload.clone());
            }
        });

        prop_assert_eq!(rt.block_on(cache.len()), expected.len());
        for (key, payload) in &expected {
            let stored = rt.block_on(cache.get(key)).unwrap();
            prop_assert_eq!(&stored, payload);
        }
    }
}
