//! The node store: an arena-backed hash table of tracked files and the
//! include edges between them.
//!
//! Nodes are bucketed by the hash of their *basename* and disambiguated by
//! full-path comparison, so every file named `foo.h` shares one bucket no
//! matter which directory it lives in. Nodes live in a dense vector and are
//! addressed by [`NodeId`]; their path strings and dependency arrays are
//! drawn from a single [`Arena`](catalyze_arena::Arena).

#![warn(missing_docs)]

pub mod error;
pub mod node;
pub mod query;
pub mod store;

pub use error::StoreError;
pub use node::{NodeId, NodeRef};
pub use store::{EdgeInsert, GrowthPolicy, NodeStore, INITIAL_DEP_CAPACITY};
