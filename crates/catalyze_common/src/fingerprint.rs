//! 32-bit file fingerprints for change detection.
//!
//! Two strategies are offered. The content strategy folds the file name, its
//! size and modification time, and every content byte into a DJB2 hash. The
//! metadata strategy XORs the modification time, size and inode together and
//! never reads the file. Neither is cryptographic; both are stable for an
//! unchanged file, and they are not comparable with each other.

use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::hash::{djb2, djb2_continue};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A 32-bit fingerprint of a file's identity and (optionally) content.
///
/// The value `0` is reserved as [`Fingerprint::UNKNOWN`]: it is produced when
/// a file cannot be opened or stat'd and means "force a re-scan". Callers must
/// never treat it as the fingerprint of an empty file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// Sentinel for a file whose fingerprint could not be computed.
    pub const UNKNOWN: Fingerprint = Fingerprint(0);

    /// Wraps a raw 32-bit value (e.g. one read back from the cache file).
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw 32-bit value.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns `true` for the "unknown / force re-scan" sentinel.
    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// Content fingerprint: name, size, sub-second mtime, then every byte.
    ///
    /// Seeds with 5381, folds `name` with `h = h * 33 + byte`, XORs the low and
    /// then the high 32 bits of the size, XORs the nanosecond fraction of the
    /// mtime, and finally folds `bytes` (when supplied) with the same
    /// recurrence.
    pub fn of_content(name: &str, stamp: &FileStamp, bytes: Option<&[u8]>) -> Self {
        let mut hash = djb2(name.as_bytes());
        hash ^= stamp.size as u32;
        hash ^= (stamp.size >> 32) as u32;
        hash ^= stamp.mtime_subsec_nanos();
        if let Some(bytes) = bytes {
            hash = djb2_continue(hash, bytes);
        }
        Self(hash)
    }

    /// Metadata-only fingerprint: `mtime ^ size ^ inode`, folded to 32 bits.
    pub fn of_metadata(stamp: &FileStamp) -> Self {
        let mixed = stamp.mtime_ns ^ stamp.size ^ stamp.inode;
        Self((mixed as u32) ^ ((mixed >> 32) as u32))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:08x})", self.0)
    }
}

/// The file metadata that feeds a fingerprint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStamp {
    /// File size in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch.
    pub mtime_ns: u64,
    /// Inode number (`0` on platforms without one).
    pub inode: u64,
}

impl FileStamp {
    /// Extracts size, mtime and inode from filesystem metadata.
    ///
    /// A platform that cannot report an mtime yields `mtime_ns == 0`.
    pub fn from_metadata(meta: &Metadata) -> Self {
        let mtime_ns = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self {
            size: meta.len(),
            mtime_ns,
            inode: inode_of(meta),
        }
    }

    /// The nanosecond fraction of the modification time.
    pub fn mtime_subsec_nanos(&self) -> u32 {
        (self.mtime_ns % NANOS_PER_SEC) as u32
    }
}

#[cfg(unix)]
fn inode_of(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode_of(_meta: &Metadata) -> u64 {
    0
}

/// Which fingerprint function to use for tracked files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintStrategy {
    /// Hash name, metadata and every content byte.
    #[default]
    Content,
    /// Hash metadata only; the file is never read.
    Metadata,
}

impl FingerprintStrategy {
    /// Returns `true` if this strategy needs the file's bytes.
    pub fn needs_content(self) -> bool {
        matches!(self, FingerprintStrategy::Content)
    }

    /// Computes a fingerprint from already-loaded inputs.
    ///
    /// `bytes` is ignored by the metadata strategy.
    pub fn compute(self, name: &str, stamp: &FileStamp, bytes: Option<&[u8]>) -> Fingerprint {
        match self {
            FingerprintStrategy::Content => Fingerprint::of_content(name, stamp, bytes),
            FingerprintStrategy::Metadata => Fingerprint::of_metadata(stamp),
        }
    }
}

/// Fingerprints the file at `path`, hashing `name` as its identity.
///
/// `name` is the path as it appears in the tracked file list; `path` is where
/// it lives on disk. Returns [`Fingerprint::UNKNOWN`] if the file cannot be
/// stat'd or (for the content strategy) read.
pub fn fingerprint_file(path: &Path, name: &str, strategy: FingerprintStrategy) -> Fingerprint {
    let Ok(meta) = std::fs::metadata(path) else {
        return Fingerprint::UNKNOWN;
    };
    let stamp = FileStamp::from_metadata(&meta);
    if !strategy.needs_content() {
        return strategy.compute(name, &stamp, None);
    }
    match std::fs::read(path) {
        Ok(bytes) => strategy.compute(name, &stamp, Some(&bytes)),
        Err(_) => Fingerprint::UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(size: u64, mtime_ns: u64) -> FileStamp {
        FileStamp {
            size,
            mtime_ns,
            inode: 42,
        }
    }

    #[test]
    fn content_is_deterministic() {
        let s = stamp(11, 1_700_000_000_123_456_789);
        let a = Fingerprint::of_content("src/foo.c", &s, Some(b"int main();"));
        let b = Fingerprint::of_content("src/foo.c", &s, Some(b"int main();"));
        assert_eq!(a, b);
    }

    #[test]
    fn content_matches_manual_recurrence() {
        let s = stamp(3, 5 * NANOS_PER_SEC + 7);
        let mut expected: u32 = 5381;
        for &b in b"a.c" {
            expected = expected.wrapping_mul(33).wrapping_add(u32::from(b));
        }
        expected ^= 3;
        expected ^= 7;
        for &b in b"xyz" {
            expected = expected.wrapping_mul(33).wrapping_add(u32::from(b));
        }
        let got = Fingerprint::of_content("a.c", &s, Some(b"xyz"));
        assert_eq!(got.as_raw(), expected);
    }

    #[test]
    fn high_size_bits_participate() {
        let low = Fingerprint::of_content("a", &stamp(1, 0), None);
        let high = Fingerprint::of_content("a", &stamp(1 | (1 << 40), 0), None);
        assert_ne!(low, high);
    }

    #[test]
    fn only_subsecond_mtime_participates() {
        let a = Fingerprint::of_content("a", &stamp(1, 10 * NANOS_PER_SEC + 5), None);
        let b = Fingerprint::of_content("a", &stamp(1, 99 * NANOS_PER_SEC + 5), None);
        let c = Fingerprint::of_content("a", &stamp(1, 99 * NANOS_PER_SEC + 6), None);
        assert_eq!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn any_content_byte_changes_content_fingerprint() {
        let s = stamp(16, 0);
        let base = b"#include \"x.h\"\n\n".to_vec();
        let original = Fingerprint::of_content("f.c", &s, Some(&base));
        for i in 0..base.len() {
            let mut changed = base.clone();
            changed[i] ^= 0x01;
            let fp = Fingerprint::of_content("f.c", &s, Some(&changed));
            assert_ne!(fp, original, "byte {i} did not affect the fingerprint");
        }
    }

    #[test]
    fn metadata_ignores_content() {
        let s = stamp(16, 123);
        let a = FingerprintStrategy::Metadata.compute("a.c", &s, Some(b"one"));
        let b = FingerprintStrategy::Metadata.compute("a.c", &s, Some(b"two"));
        assert_eq!(a, b);
        assert_eq!(a, Fingerprint::of_metadata(&s));
    }

    #[test]
    fn metadata_tracks_inode() {
        let mut s = stamp(16, 123);
        let a = Fingerprint::of_metadata(&s);
        s.inode = 43;
        assert_ne!(a, Fingerprint::of_metadata(&s));
    }

    #[test]
    fn unknown_sentinel() {
        assert!(Fingerprint::UNKNOWN.is_unknown());
        assert!(!Fingerprint::from_raw(1).is_unknown());
        assert_eq!(Fingerprint::default(), Fingerprint::UNKNOWN);
    }

    #[test]
    fn display_is_bare_hex() {
        assert_eq!(Fingerprint::from_raw(0xbeef).to_string(), "beef");
        assert_eq!(format!("{:?}", Fingerprint::from_raw(0xbeef)), "Fingerprint(0000beef)");
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&Fingerprint::from_raw(7)).unwrap();
        assert_eq!(json, "7");
        let strategy: FingerprintStrategy = serde_json::from_str("\"metadata\"").unwrap();
        assert_eq!(strategy, FingerprintStrategy::Metadata);
    }

    #[test]
    fn fingerprint_file_missing_is_unknown() {
        let fp = fingerprint_file(
            Path::new("/nonexistent/catalyze/x.c"),
            "x.c",
            FingerprintStrategy::Content,
        );
        assert!(fp.is_unknown());
        let fp = fingerprint_file(
            Path::new("/nonexistent/catalyze/x.c"),
            "x.c",
            FingerprintStrategy::Metadata,
        );
        assert!(fp.is_unknown());
    }

    #[test]
    fn fingerprint_file_stable_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.c");
        std::fs::write(&path, "#include \"foo.h\"\n").unwrap();

        let a = fingerprint_file(&path, "foo.c", FingerprintStrategy::Content);
        let b = fingerprint_file(&path, "foo.c", FingerprintStrategy::Content);
        assert_eq!(a, b);

        let meta = std::fs::metadata(&path).unwrap();
        let expected = Fingerprint::of_content(
            "foo.c",
            &FileStamp::from_metadata(&meta),
            Some(b"#include \"foo.h\"\n"),
        );
        assert_eq!(a, expected);
    }
}
