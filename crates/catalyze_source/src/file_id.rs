//! Opaque identifier for files loaded into a [`SourceDb`](crate::SourceDb).

use serde::{Deserialize, Serialize};

/// Index of a file within the [`SourceDb`](crate::SourceDb) that loaded it.
///
/// Ids follow the order files were added, starting at 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
