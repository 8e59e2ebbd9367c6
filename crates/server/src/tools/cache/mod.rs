//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting, invalidating and exporting the
//! in-memory response cache.

pub mod bust;
pub mod export;
pub mod lookup;

pub use bust::{CacheBustParams, bust_impl};
pub use export::{CacheExportParams, export_impl};
pub use lookup::{CacheLookupParams, lookup_impl};
