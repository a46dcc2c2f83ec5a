//! Error types for node-store operations.

/// Errors raised by the node store.
///
/// There is no rollback: when an operation fails part-way, whatever it had
/// already linked into the store stays linked.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The arena could not satisfy an allocation.
    #[error("arena exhausted: requested {requested} bytes with {remaining} remaining")]
    ArenaExhausted {
        /// Size of the failed request in bytes.
        requested: usize,
        /// Bytes left in the arena at the time of the request.
        remaining: usize,
    },

    /// The bucket array cannot be sized to hold the requested capacity.
    #[error("bucket capacity overflow (requested {requested})")]
    CapacityOverflow {
        /// The capacity that could not be represented.
        requested: usize,
    },
}
