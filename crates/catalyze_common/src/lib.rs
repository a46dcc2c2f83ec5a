//! Shared foundational types used across the catalyze build core.
//!
//! This crate provides the DJB2-family path and name hashes that key the node
//! store and the on-disk cache, the 32-bit [`Fingerprint`] used for change
//! detection, and the strategy enums selected through configuration.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod hash;
pub mod scan_mode;

pub use fingerprint::{fingerprint_file, FileStamp, Fingerprint, FingerprintStrategy};
pub use hash::{basename, djb2, hash_path, hash_string};
pub use scan_mode::ScanMode;
