//! Key Routing
//!
//! Maps keys to bucket indices with a 32-bit FNV-1 hash.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1 hash of the key's bytes.
pub fn fnv1_32(key: &str) -> u32 {
    key.as_bytes().iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        hash.wrapping_mul(FNV_PRIME) ^ u32::from(*byte)
    })
}

/// Bucket index for `key` among `depth` buckets.
///
/// Always in `0..depth` for a positive depth.
pub fn bucket_index(key: &str, depth: usize) -> usize {
    debug_assert!(depth > 0);
    fnv1_32(key) as usize % depth
}
