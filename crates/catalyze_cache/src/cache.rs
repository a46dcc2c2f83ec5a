//! High-level cache orchestrator.
//!
//! The `Cache` loads the previous run's pairs once, diffs fresh fingerprints
//! against them, and writes the current pairs back when asked.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cached_files::CachedFiles;
use crate::diff::{detect_changes, ChangeSet, TrackedFingerprint};
use crate::error::CacheError;

/// File name of the cache, relative to the project root.
pub const DEFAULT_CACHE_FILE: &str = "catalyze.cache";

/// The cache file for one project.
pub struct Cache {
    /// Where the cache lives on disk.
    path: PathBuf,

    /// Pairs from the previous run, or `None` if there was no cache file.
    previous: Option<CachedFiles>,
}

impl Cache {
    /// Loads the cache at `path`, keeping at most `capacity` pairs.
    ///
    /// A missing file is not an error: the cache starts empty and every file
    /// is treated as new. Any other read failure is returned.
    pub fn load_or_create(path: &Path, capacity: usize) -> Result<Self, CacheError> {
        let previous = CachedFiles::load(path, capacity)?;
        match &previous {
            Some(p) => debug!(path = %path.display(), pairs = p.len(), "using previous cache"),
            None => info!(path = %path.display(), "no previous cache; every file is new"),
        }
        Ok(Self {
            path: path.to_path_buf(),
            previous,
        })
    }

    /// Where the cache lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pairs from the previous run, if a cache file existed.
    pub fn previous(&self) -> Option<&CachedFiles> {
        self.previous.as_ref()
    }

    /// Classifies `current` against the previous run.
    pub fn detect_changes(&self, current: &[TrackedFingerprint]) -> ChangeSet {
        detect_changes(current, self.previous.as_ref())
    }

    /// Writes `current` to disk in the given order and makes it the
    /// baseline for later [`detect_changes`](Self::detect_changes) calls.
    pub fn save(&mut self, current: &[TrackedFingerprint]) -> Result<(), CacheError> {
        let mut pairs = CachedFiles::with_capacity(current.len());
        for file in current {
            pairs.push(file.name_hash, file.content_hash);
        }
        pairs.save(&self.path)?;
        info!(path = %self.path.display(), pairs = pairs.len(), "cache written");
        self.previous = Some(pairs);
        Ok(())
    }
}
