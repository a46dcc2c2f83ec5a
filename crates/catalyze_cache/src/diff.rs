//! Classifying tracked files against the previous run's cache.

use catalyze_common::{hash_string, Fingerprint};

use crate::cached_files::CachedFiles;

/// A tracked file's fresh fingerprint, keyed the way the cache keys it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedFingerprint {
    /// The path as listed in the tracked-file list.
    pub path: String,
    /// DJB2 of the full `path`; the cache key.
    pub name_hash: u32,
    /// Fingerprint computed this run.
    pub content_hash: Fingerprint,
}

impl TrackedFingerprint {
    /// Keys `path` by the hash of its full text.
    pub fn new(path: impl Into<String>, content_hash: Fingerprint) -> Self {
        let path = path.into();
        Self {
            name_hash: hash_string(&path),
            path,
            content_hash,
        }
    }
}

/// Result of comparing fresh fingerprints against the cache.
///
/// Paths keep the order of the tracked-file list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Files with no cache entry.
    pub new_files: Vec<String>,

    /// Files whose cached fingerprint differs, or whose fresh fingerprint is
    /// unknown.
    pub modified_files: Vec<String>,

    /// Files whose fingerprint matches the cache.
    pub unchanged_files: Vec<String>,

    /// Cached name hashes that match no tracked file.
    pub deleted: Vec<u32>,
}

impl ChangeSet {
    /// Returns `true` if nothing is new, modified or deleted.
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty() && self.deleted.is_empty()
    }

    /// Returns the number of files that need re-scanning (new + modified).
    pub fn dirty_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len()
    }
}

/// Classifies each of `current` against `previous`.
///
/// With no previous cache every file is new. A file whose fresh fingerprint
/// is [`Fingerprint::UNKNOWN`] is never unchanged: it is modified if cached
/// and new otherwise.
pub fn detect_changes(current: &[TrackedFingerprint], previous: Option<&CachedFiles>) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for file in current {
        let cached = previous.and_then(|p| p.get(file.name_hash));
        match cached {
            None => changes.new_files.push(file.path.clone()),
            Some(old) if old == file.content_hash && !file.content_hash.is_unknown() => {
                changes.unchanged_files.push(file.path.clone())
            }
            Some(_) => changes.modified_files.push(file.path.clone()),
        }
    }

    if let Some(previous) = previous {
        changes.deleted = previous
            .iter()
            .map(|(name_hash, _)| name_hash)
            .filter(|h| !current.iter().any(|f| f.name_hash == *h))
            .collect();
    }
    changes
}
