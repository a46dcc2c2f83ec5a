//! Include-directive scanning for C sources.
//!
//! [`scan`] walks a file's raw bytes, finds every `#include`, resolves quoted
//! targets relative to the including file and records one edge per target in
//! a [`NodeStore`](catalyze_graph::NodeStore). The scanner is not a
//! preprocessor: comments, string literals and conditional compilation are
//! not understood, so every directive it finds is taken as real.

#![warn(missing_docs)]

pub mod finder;
pub mod include;
pub mod resolve;
pub mod scanner;

pub use finder::{find_directives, find_directives_lanes, find_directives_scalar, LANE_WIDTH};
pub use include::{classify, Directive, SkipReason};
pub use resolve::resolve_include;
pub use scanner::{scan, scan_node, ScanReport};
