//! The `name_hash,content_hash,...` text format.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use catalyze_common::Fingerprint;
use tracing::debug;

use crate::error::CacheError;

/// Parses one hex field the way C's `strtoul(s, NULL, 16)` does.
///
/// Leading ASCII whitespace is skipped, then an optional `0x`/`0X` prefix,
/// then the longest run of hex digits is read. No digits parses as `0`;
/// values past `u32::MAX` saturate.
pub fn parse_hex(field: &[u8]) -> u32 {
    let start = field
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(field.len());
    let mut digits = &field[start..];
    if let [b'0', b'x' | b'X', next, ..] = digits {
        if next.is_ascii_hexdigit() {
            digits = &digits[2..];
        }
    }

    let mut value: u32 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_hexdigit()) {
        let nibble = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => b - b'A' + 10,
        };
        value = match value.checked_mul(16) {
            Some(v) => v | u32::from(nibble),
            None => return u32::MAX,
        };
    }
    value
}

/// Previously recorded `(name_hash, content_hash)` pairs.
///
/// Holds at most `capacity` pairs, in file order. Lookups are by
/// `name_hash`; if a hash occurs twice the first pair wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CachedFiles {
    name_hashes: Vec<u32>,
    content_hashes: Vec<Fingerprint>,
    capacity: usize,
}

impl CachedFiles {
    /// An empty set that accepts up to `capacity` pairs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            name_hashes: Vec::with_capacity(capacity),
            content_hashes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Parses cache text, keeping at most `capacity` pairs.
    ///
    /// Parsing stops at a NUL byte, at end of input, once `capacity` pairs
    /// are read, or at a name hash with no comma after it. In every case the
    /// pairs read so far are kept. A name hash followed by a comma and then
    /// end of input yields a pair with content hash `0`.
    pub fn parse(text: &[u8], capacity: usize) -> Self {
        let text = match text.iter().position(|&b| b == 0) {
            Some(end) => &text[..end],
            None => text,
        };
        let mut out = Self::with_capacity(capacity);
        let mut fields = text.split(|&b| b == b',');

        while !out.is_full() {
            let Some(name) = fields.next() else { break };
            // A name with no comma after it is the final split piece.
            let Some(content) = fields.next() else { break };
            out.push(parse_hex(name), Fingerprint::from_raw(parse_hex(content)));
        }
        out
    }

    /// Reads and parses the cache file at `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load(path: &Path, capacity: usize) -> Result<Option<Self>, CacheError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file");
                return Ok(None);
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let parsed = Self::parse(&bytes, capacity);
        debug!(path = %path.display(), pairs = parsed.len(), "cache loaded");
        Ok(Some(parsed))
    }

    /// Writes the pairs to `path` in the text format.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        std::fs::write(path, self.to_string()).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Appends a pair. Returns `false`, leaving the set unchanged, when full.
    pub fn push(&mut self, name_hash: u32, content_hash: Fingerprint) -> bool {
        if self.is_full() {
            return false;
        }
        self.name_hashes.push(name_hash);
        self.content_hashes.push(content_hash);
        true
    }

    /// The recorded content hash for `name_hash`.
    pub fn get(&self, name_hash: u32) -> Option<Fingerprint> {
        self.name_hashes
            .iter()
            .position(|&h| h == name_hash)
            .map(|i| self.content_hashes[i])
    }

    /// Returns `true` if `name_hash` has a recorded pair.
    pub fn contains(&self, name_hash: u32) -> bool {
        self.name_hashes.contains(&name_hash)
    }

    /// Pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Fingerprint)> + '_ {
        self.name_hashes
            .iter()
            .copied()
            .zip(self.content_hashes.iter().copied())
    }

    /// Number of pairs held.
    pub fn len(&self) -> usize {
        self.name_hashes.len()
    }

    /// Returns `true` if no pairs are held.
    pub fn is_empty(&self) -> bool {
        self.name_hashes.is_empty()
    }

    /// Maximum number of pairs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }
}

impl fmt::Display for CachedFiles {
    /// `name,content,name,content` in lowercase hex with no trailing comma.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, content)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name:x},{content}")?;
        }
        Ok(())
    }
}
