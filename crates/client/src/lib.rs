//! Request-path collaborators for replay.
//!
//! This crate provides the caching interceptor that sits in front of a
//! request handler, a reqwest-backed handler, and URL helpers that turn raw
//! URLs into request descriptors.

pub mod fetch;
pub mod handler;
pub mod interceptor;

pub use fetch::{FetchConfig, ReqwestHandler, UrlError, canonicalize, request_from_url};
pub use handler::HttpHandler;
pub use interceptor::{CachingInterceptor, Intercepted, SharedStore};
