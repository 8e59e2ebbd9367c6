//! Core types and shared functionality for replay.
//!
//! This crate provides:
//! - The HTTP response cache (store, matcher, snapshot codec)
//! - Loose structural equality for JSON-like values
//! - Topological ordering of dependency graphs
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod graph;

pub use cache::{CacheEntry, CacheSettings, HttpCacheStore, SerializedCacheEntry};
pub use config::AppConfig;
pub use error::Error;
