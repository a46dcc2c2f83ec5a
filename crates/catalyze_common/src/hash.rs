//! DJB2 string hashing for node-store buckets and cache keys.

/// Initial value of the DJB2 recurrence.
pub const DJB2_SEED: u32 = 5381;

/// Folds `bytes` into `hash` with the DJB2 recurrence `h = h * 33 + byte`.
///
/// Arithmetic wraps at 32 bits. Exposed so that the fingerprint functions can
/// continue a hash that has already absorbed other fields.
#[inline]
pub fn djb2_continue(hash: u32, bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(hash, |h, &b| h.wrapping_mul(33).wrapping_add(u32::from(b)))
}

/// Computes the DJB2 hash of a byte slice.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    djb2_continue(DJB2_SEED, bytes)
}

/// Hashes a full string. Used as the `name_hash` key in the cache file.
pub fn hash_string(s: &str) -> u32 {
    djb2(s.as_bytes())
}

/// Returns the basename of `path`: everything after the last `/`.
///
/// A path without a separator is its own basename; a path ending in `/` has
/// an empty basename.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Hashes only the basename of `path`.
///
/// `src/foo.h` and `include/foo.h` hash identically, which is what places
/// same-named files in the same node-store bucket.
pub fn hash_path(path: &str) -> u32 {
    hash_string(basename(path))
}
