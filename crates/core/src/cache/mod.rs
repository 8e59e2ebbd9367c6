//! In-memory HTTP response cache.
//!
//! This module decides whether a previously observed response can satisfy
//! a new request. It provides:
//!
//! - Request/response descriptors and the event model
//! - Fingerprint matching with loose parameter comparison
//! - An insertion-ordered store with single and full busting
//! - A codec for the JSON snapshot layout, plus snapshot file helpers

pub mod codec;
pub mod entry;
pub mod headers;
pub mod matcher;
pub mod params;
pub mod settings;
pub mod snapshots;
pub mod store;

pub use crate::Error;

pub use codec::{CodecError, SerializedCacheEntry, SerializedRequest, SerializedResponse};
pub use entry::{CacheEntry, HttpEvent, HttpEventType, HttpRequest, HttpResponse, ResponseType};
pub use headers::{FlatHeaders, FlatValue, HttpHeaders};
pub use matcher::{Fingerprint, ParamMatching};
pub use params::HttpParams;
pub use settings::CacheSettings;
pub use store::{HttpCacheStore, StoreEvent};
