//! Dependency graph ordering.
//!
//! Nodes are supplied by the caller and expose their relations by key;
//! the sorter never owns or links them.

pub mod kahn;

pub use kahn::{CycleError, DependencyNode, kahn_sort, try_kahn_sort};
