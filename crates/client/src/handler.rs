//! The seam between the cache and whatever actually performs requests.

use async_trait::async_trait;
use replay_core::Error;
use replay_core::cache::{HttpEvent, HttpRequest};

/// Something that turns a request into the events it produces.
///
/// The returned events are in arrival order; a successful exchange ends
/// with exactly one [`HttpEvent::Response`].
#[async_trait]
pub trait HttpHandler: Send + Sync {
    async fn handle(&self, request: &HttpRequest) -> Result<Vec<HttpEvent>, Error>;
}

#[async_trait]
impl<H: HttpHandler + ?Sized> HttpHandler for std::sync::Arc<H> {
    async fn handle(&self, request: &HttpRequest) -> Result<Vec<HttpEvent>, Error> {
        (**self).handle(request).await
    }
}
