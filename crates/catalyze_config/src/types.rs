//! Configuration types deserialized from `catalyze.toml`.

use catalyze_common::{FingerprintStrategy, ScanMode};
use serde::Deserialize;

/// Default node-store bucket count.
pub const DEFAULT_STORE_CAPACITY: usize = 128;

/// Largest accepted node-store bucket count.
pub const MAX_STORE_CAPACITY: usize = 1 << 24;

/// Default hard arena capacity (16 MiB).
pub const DEFAULT_ARENA_BYTES: usize = 16 * 1024 * 1024;

/// The top-level project configuration parsed from `catalyze.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project name and tracked file list.
    pub project: ProjectMeta,
    /// Cache file location.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Node-store sizing.
    #[serde(default)]
    pub store: StoreConfig,
    /// Fingerprint function.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    /// Directive search.
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Core project metadata required in every `catalyze.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Tracked files, relative to the project root, in build order.
    ///
    /// Each entry is the node-store key for that file, so it should be
    /// written the way include directives will resolve to it.
    pub files: Vec<String>,
}

/// Where the fingerprint cache is kept.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Cache file path, relative to the project root.
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> String {
    "catalyze.cache".to_string()
}

/// Node-store sizing and growth.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Initial bucket count hint; rounded up to a power of two.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Hard arena capacity in bytes.
    #[serde(default = "default_arena_bytes")]
    pub arena_bytes: usize,
    /// Redistribute nodes when the bucket array doubles.
    ///
    /// Off by default: growth then only extends the bucket array, and nodes
    /// whose bucket changes under the wider mask become unreachable by path.
    #[serde(default)]
    pub rehash_on_grow: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_STORE_CAPACITY,
            arena_bytes: DEFAULT_ARENA_BYTES,
            rehash_on_grow: false,
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_STORE_CAPACITY
}

fn default_arena_bytes() -> usize {
    DEFAULT_ARENA_BYTES
}

/// Fingerprint settings.
#[derive(Debug, Default, Deserialize)]
pub struct FingerprintConfig {
    /// `"content"` (default) or `"metadata"`.
    #[serde(default)]
    pub strategy: FingerprintStrategy,
}

/// Scanner settings.
#[derive(Debug, Default, Deserialize)]
pub struct ScanConfig {
    /// `"lanes"` (default) or `"scalar"`.
    #[serde(default)]
    pub mode: ScanMode,
}
