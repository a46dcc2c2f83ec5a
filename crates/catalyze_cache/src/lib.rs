//! The persisted fingerprint cache and change detection.
//!
//! The cache is a flat text file of `name_hash,content_hash` pairs in
//! lowercase hex, one pair per tracked file, in tracked-file order. On the
//! next run it is parsed into [`CachedFiles`] and diffed against fresh
//! fingerprints to produce a [`ChangeSet`]. A missing cache file simply
//! means every file is new.

#![warn(missing_docs)]

pub mod cache;
pub mod cached_files;
pub mod diff;
pub mod error;

pub use cache::{Cache, DEFAULT_CACHE_FILE};
pub use cached_files::{parse_hex, CachedFiles};
pub use diff::{detect_changes, ChangeSet, TrackedFingerprint};
pub use error::CacheError;
