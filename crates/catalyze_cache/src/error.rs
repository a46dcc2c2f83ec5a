//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while reading or writing the cache file.
///
/// A missing cache file is not an error; it loads as "no prior cache".
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing the cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
