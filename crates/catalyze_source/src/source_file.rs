//! A tracked file as read from disk.

use catalyze_common::{FileStamp, Fingerprint};

use crate::file_id::FileId;

/// A tracked file loaded into the [`SourceDb`](crate::SourceDb).
pub struct SourceFile {
    /// The unique identifier for this file within its database.
    pub id: FileId,
    /// The path as listed in the tracked-file list. This is the node-store key.
    pub path: String,
    /// Raw file contents. Not required to be UTF-8.
    pub bytes: Vec<u8>,
    /// Size, mtime and inode at load time.
    pub stamp: FileStamp,
    /// Fingerprint of `path`, `stamp` and (for the content strategy) `bytes`.
    pub fingerprint: Fingerprint,
}

impl SourceFile {
    /// Length of the contents in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for an empty file.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("bytes", &self.bytes.len())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}
