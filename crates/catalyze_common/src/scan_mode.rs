//! Selection between the lane-parallel and scalar directive searches.

use serde::{Deserialize, Serialize};

/// How the include scanner searches a buffer for `#include`.
///
/// Both modes find exactly the same directives; `Lanes` examines the buffer in
/// fixed-width blocks and is the default, `Scalar` is a byte-at-a-time
/// reference used for cross-checking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// 32-byte lanes with a scalar tail.
    #[default]
    Lanes,
    /// One byte at a time.
    Scalar,
}
