//! Central database of all tracked files in one build run.

use std::path::Path;

use catalyze_common::{FileStamp, Fingerprint, FingerprintStrategy};
use rayon::prelude::*;
use tracing::debug;

use crate::error::LoadError;
use crate::file_id::FileId;
use crate::source_file::SourceFile;

/// Bytes and metadata read for one file, before it is registered.
struct RawFile {
    path: String,
    bytes: Vec<u8>,
    stamp: FileStamp,
}

fn read_tracked(root: &Path, tracked: &str) -> Result<RawFile, LoadError> {
    let path = root.join(tracked);
    let io_err = |source| LoadError::Io {
        tracked: tracked.to_string(),
        path: path.clone(),
        source,
    };
    let meta = std::fs::metadata(&path).map_err(io_err)?;
    let bytes = std::fs::read(&path).map_err(io_err)?;
    Ok(RawFile {
        path: tracked.to_string(),
        bytes,
        stamp: FileStamp::from_metadata(&meta),
    })
}

/// The source database, owning the bytes of every loaded file.
pub struct SourceDb {
    files: Vec<SourceFile>,
    strategy: FingerprintStrategy,
}

impl SourceDb {
    /// Creates an empty database that fingerprints with `strategy`.
    pub fn new(strategy: FingerprintStrategy) -> Self {
        Self {
            files: Vec::new(),
            strategy,
        }
    }

    /// Loads every path in `tracked`, reading and fingerprinting in parallel.
    ///
    /// Results are returned in input order, and successfully read files are
    /// registered in that order too, so ids are stable across runs. A failure
    /// for one file does not stop the others from loading.
    pub fn load_all(
        &mut self,
        root: &Path,
        tracked: &[String],
    ) -> Vec<Result<FileId, LoadError>> {
        let strategy = self.strategy;
        let raws: Vec<Result<(RawFile, Fingerprint), LoadError>> = tracked
            .par_iter()
            .map(|t| {
                let raw = read_tracked(root, t)?;
                let fp = strategy.compute(&raw.path, &raw.stamp, Some(&raw.bytes));
                Ok((raw, fp))
            })
            .collect();

        raws.into_iter()
            .map(|r| r.map(|(raw, fingerprint)| self.push(raw, fingerprint)))
            .collect()
    }

    /// Adds an in-memory file (useful for tests).
    pub fn add_source(
        &mut self,
        path: impl Into<String>,
        bytes: Vec<u8>,
        stamp: FileStamp,
    ) -> FileId {
        self.insert(RawFile {
            path: path.into(),
            bytes,
            stamp,
        })
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` is invalid.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// All loaded files in load order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn insert(&mut self, raw: RawFile) -> FileId {
        let fingerprint = self
            .strategy
            .compute(&raw.path, &raw.stamp, Some(&raw.bytes));
        self.push(raw, fingerprint)
    }

    fn push(&mut self, raw: RawFile, fingerprint: Fingerprint) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        debug!(path = %raw.path, bytes = raw.bytes.len(), %fingerprint, "loaded source");
        self.files.push(SourceFile {
            id,
            path: raw.path,
            bytes: raw.bytes,
            stamp: raw.stamp,
            fingerprint,
        });
        id
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new(FingerprintStrategy::default())
    }
}

#[cfg(test)]
mod tests {
    use catalyze_common::fingerprint_file;

    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn add_and_get() {
        let mut db = SourceDb::default();
        let id = db.add_source("test.c", b"int x;".to_vec(), FileStamp::default());
        let file = db.get_file(id);
        assert_eq!(file.bytes, b"int x;");
        assert_eq!(file.path, "test.c");
        assert!(!file.fingerprint.is_unknown());
    }

    #[test]
    fn multiple_files() {
        let mut db = SourceDb::default();
        let id1 = db.add_source("a.c", b"one".to_vec(), FileStamp::default());
        let id2 = db.add_source("b.c", b"two".to_vec(), FileStamp::default());
        assert_ne!(id1, id2);
        assert_eq!(db.len(), 2);
        assert_eq!(db.get_file(id2).bytes, b"two");
    }

    #[test]
    fn fingerprint_uses_tracked_path() {
        let stamp = FileStamp {
            size: 4,
            mtime_ns: 9,
            inode: 1,
        };
        let mut db = SourceDb::new(FingerprintStrategy::Content);
        let id = db.add_source("src/a.c", b"abcd".to_vec(), stamp);
        assert_eq!(
            db.get_file(id).fingerprint,
            Fingerprint::of_content("src/a.c", &stamp, Some(b"abcd"))
        );
        assert_eq!(db.get_file(id).len(), 4);
    }

    #[test]
    fn metadata_strategy_ignores_bytes() {
        let stamp = FileStamp {
            size: 4,
            mtime_ns: 9,
            inode: 1,
        };
        let mut db = SourceDb::new(FingerprintStrategy::Metadata);
        let id = db.add_source("a.c", b"abcd".to_vec(), stamp);
        assert_eq!(db.get_file(id).fingerprint, Fingerprint::of_metadata(&stamp));
    }

    #[test]
    fn load_from_disk_matches_fingerprint_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main.c", "#include \"main.h\"\n");

        let mut db = SourceDb::new(FingerprintStrategy::Content);
        let results = db.load_all(dir.path(), &["src/main.c".to_string()]);
        let id = *results[0].as_ref().unwrap();
        let file = db.get_file(id);
        assert_eq!(file.path, "src/main.c");
        assert_eq!(file.bytes, b"#include \"main.h\"\n");
        assert_eq!(
            file.fingerprint,
            fingerprint_file(
                &dir.path().join("src/main.c"),
                "src/main.c",
                FingerprintStrategy::Content
            )
        );
    }

    #[test]
    fn load_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = SourceDb::default();
        let mut results = db.load_all(dir.path(), &["nope.c".to_string()]);
        let err = results.remove(0).unwrap_err();
        assert_eq!(err.tracked(), "nope.c");
        assert!(db.is_empty());
    }

    #[test]
    fn load_all_keeps_input_order_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..20).map(|i| format!("f{i}.c")).collect();
        for name in &names {
            write(dir.path(), name, name);
        }
        let mut tracked = names.clone();
        tracked.insert(5, "missing.c".to_string());

        let mut db = SourceDb::new(FingerprintStrategy::Metadata);
        let results = db.load_all(dir.path(), &tracked);
        assert_eq!(results.len(), 21);
        assert_eq!(results[5].as_ref().unwrap_err().tracked(), "missing.c");

        let loaded: Vec<&str> = db.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(loaded, names.iter().map(String::as_str).collect::<Vec<_>>());
        for (i, file) in db.files().iter().enumerate() {
            assert_eq!(file.id.as_raw() as usize, i);
            assert_ne!(file.fingerprint, Fingerprint::UNKNOWN);
        }
    }
}
