//! Caching interceptor.
//!
//! Sits in front of an [`HttpHandler`]. A request whose fingerprint is
//! already stored is answered from the store and never reaches the handler;
//! anything else is forwarded and every event the handler produces is
//! offered to the store, which keeps only the completed response.
//!
//! With `only_use_cache` set, a miss fails with [`Error::CacheMiss`] and the
//! next handler is never called.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::handler::HttpHandler;
use replay_core::Error;
use replay_core::cache::{CacheSettings, Fingerprint, HttpCacheStore, HttpEvent, HttpRequest, HttpResponse};

/// Store shared between the interceptor and the tools that inspect it.
pub type SharedStore = Arc<Mutex<HttpCacheStore>>;

/// Events produced for one request, and where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Intercepted {
    pub events: Vec<HttpEvent>,
    /// True when the response was served from the store.
    pub cached: bool,
}

impl Intercepted {
    /// The terminal response, if the exchange produced one.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.events.iter().find_map(HttpEvent::as_response)
    }
}

pub struct CachingInterceptor<H> {
    store: SharedStore,
    next: H,
}

impl<H: HttpHandler> CachingInterceptor<H> {
    pub fn new(store: SharedStore, next: H) -> Self {
        Self { store, next }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Serve `request` from the store or forward it to the next handler.
    ///
    /// The store lock is released while the next handler runs, so a
    /// cancelled or failed forward leaves the store untouched.
    pub async fn intercept(&self, request: &HttpRequest) -> Result<Intercepted, Error> {
        let verbose = {
            let store = self.store.lock().await;
            let CacheSettings { enable_interceptor, only_use_cache, verbose, .. } = *store.settings();
            if !enable_interceptor {
                drop(store);
                let events = self.next.handle(request).await?;
                return Ok(Intercepted { events, cached: false });
            }

            if let Some(hit) = store.find(request) {
                if verbose {
                    tracing::info!(request = %Fingerprint::from(request), "served from HTTP cache, ending chain early");
                }
                return Ok(Intercepted { events: vec![HttpEvent::Response(hit.response.clone())], cached: true });
            }

            if only_use_cache {
                let fingerprint = Fingerprint::from(request);
                if verbose {
                    tracing::info!(request = %fingerprint, "cache-only mode, refusing to forward");
                }
                return Err(Error::CacheMiss(fingerprint.to_string()));
            }
            verbose
        };

        let events = self.next.handle(request).await?;

        let mut store = self.store.lock().await;
        for event in &events {
            store.insert(request, event);
        }
        if verbose {
            tracing::info!(request = %Fingerprint::from(request), events = events.len(), "forwarded uncached request");
        }

        Ok(Intercepted { events, cached: false })
    }
}

#[async_trait]
impl<H: HttpHandler> HttpHandler for CachingInterceptor<H> {
    async fn handle(&self, request: &HttpRequest) -> Result<Vec<HttpEvent>, Error> {
        Ok(self.intercept(request).await?.events)
    }
}
