//! Loading tracked source files from disk.
//!
//! The [`SourceDb`] owns the raw bytes of every tracked file together with
//! the metadata stamp and fingerprint computed when it was read. Reading and
//! fingerprinting run in parallel; files are registered in list order.

#![warn(missing_docs)]

pub mod error;
pub mod file_id;
pub mod source_db;
pub mod source_file;

pub use error::LoadError;
pub use file_id::FileId;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
