//! Capacity-bounded bump arena backing the node store.
//!
//! Every string and dependency array in the store is drawn from one
//! [`Arena`]. Allocations are append-only and addressed by [`ArenaRef`]
//! offsets, so growing the backing buffer never invalidates a handle.
//! Nothing is freed individually: [`Arena::realloc`] copies into a fresh
//! region and abandons the old one, and the whole arena is released at once
//! by [`Arena::reset`] or by dropping it.

#![warn(missing_docs)]

pub mod arena;

pub use arena::{Arena, ArenaRef, ArenaStats};
