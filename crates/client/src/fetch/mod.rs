//! Network forwarding for cache misses.
//!
//! ### Request construction
//! - Method is passed through verbatim (no case normalization)
//! - URL is the request URL plus the canonical query string
//! - JSON bodies are sent as `application/json`, string bodies as-is
//!
//! ### Response decoding
//! - `json`: parsed, falling back to the raw text when parsing fails
//! - `text`: UTF-8 (lossy)
//! - `arraybuffer`/`blob`: an array of byte values, so the body stays JSON-safe
//!
//! Non-2xx statuses are returned as errors and never reach the cache.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, header};
use serde_json::Value;
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, request_from_url};

use crate::handler::HttpHandler;
use replay_core::Error;
use replay_core::cache::{HttpEvent, HttpHeaders, HttpRequest, HttpResponse, ResponseType};

/// Configuration for the forwarding client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "replay/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "replay/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl FetchConfig {
    /// Build from the application configuration.
    pub fn from_app_config(config: &replay_core::AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// [`HttpHandler`] that performs the request over the network.
pub struct ReqwestHandler {
    http: Client,
    config: FetchConfig,
}

impl ReqwestHandler {
    /// Create a new handler with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn build(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder, Error> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid HTTP method: {}", request.method)))?;
        let target = reqwest::Url::parse(&request.url_with_params()).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let mut builder = self.http.request(method, target);
        for name in request.headers.names() {
            for value in request.headers.get_all(name).unwrap_or_default() {
                builder = builder.header(name, value.as_str());
            }
        }

        builder = match &request.body {
            Value::Null => builder,
            Value::String(text) => builder.body(text.clone()),
            body => builder.json(body),
        };
        Ok(builder)
    }
}

#[async_trait]
impl HttpHandler for ReqwestHandler {
    async fn handle(&self, request: &HttpRequest) -> Result<Vec<HttpEvent>, Error> {
        let start = Instant::now();
        let builder = self.build(request)?;

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{} {}", request.method, request.url))
            } else {
                Error::HttpError(format!("network error: {}", e))
            }
        })?;

        let status = response.status();
        let headers = convert_headers(response.headers());
        let final_url = response.url().to_string();
        let total = response.content_length();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        tracing::debug!(
            "forwarded {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        let loaded = bytes.len() as u64;
        let completed = HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers: headers.clone(),
            body: decode_body(&bytes, request.response_type),
            url: Some(final_url),
            ok: true,
        };

        Ok(vec![
            HttpEvent::Sent,
            HttpEvent::ResponseHeader { status: status.as_u16(), headers },
            HttpEvent::DownloadProgress { loaded, total },
            HttpEvent::Response(completed),
        ])
    }
}

fn convert_headers(map: &header::HeaderMap) -> HttpHeaders {
    map.iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect()
}

fn decode_body(bytes: &Bytes, response_type: ResponseType) -> Value {
    match response_type {
        ResponseType::Json if bytes.is_empty() => Value::Null,
        ResponseType::Json => serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
        ResponseType::Text => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ResponseType::Arraybuffer | ResponseType::Blob => {
            Value::Array(bytes.iter().map(|b| Value::from(*b)).collect())
        }
    }
}
