//! Error types for source loading.

use std::path::PathBuf;

/// Failure to read a tracked file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be stat'd or read.
    #[error("failed to read {tracked} ({path}): {source}")]
    Io {
        /// The path as listed in the tracked-file list.
        tracked: String,
        /// Where the file was looked for on disk.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl LoadError {
    /// The tracked path that failed to load.
    pub fn tracked(&self) -> &str {
        match self {
            LoadError::Io { tracked, .. } => tracked,
        }
    }
}
