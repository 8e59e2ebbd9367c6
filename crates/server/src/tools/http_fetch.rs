//! http_fetch tool implementation.
//!
//! Sends a request through the caching interceptor. A stored response is
//! returned without touching the network; otherwise the request is forwarded
//! and its response recorded.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ParamMap, build_request, json_result};
use replay_client::{CachingInterceptor, HttpHandler};
use replay_core::Error;
use replay_core::cache::{FlatHeaders, HttpHeaders, ResponseType};

/// Input parameters for http_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HttpFetchParams {
    /// HTTP method. Compared case-sensitively against stored entries (default: "GET").
    #[serde(default = "default_method")]
    pub method: String,

    /// The URL to request. Any query string is folded into `params`.
    pub url: String,

    /// Additional query parameters: name to a value or list of values.
    #[serde(default)]
    pub params: Option<ParamMap>,

    /// Request headers: name to a value or list of values.
    #[serde(default)]
    pub headers: Option<FlatHeaders>,

    /// Request body. Strings are sent as-is, anything else as JSON.
    #[serde(default)]
    pub body: Option<Value>,

    /// How to decode the response body: "json" (default), "text", "arraybuffer" or "blob".
    #[serde(default)]
    pub response_type: ResponseType,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for http_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HttpFetchOutput {
    /// Whether the response came from the cache.
    pub cached: bool,
    pub status: u16,
    pub status_text: String,
    pub ok: bool,
    /// Final URL after redirects, when known.
    pub url: Option<String>,
    pub headers: FlatHeaders,
    pub body: Value,
}

/// Implementation of the http_fetch tool.
pub async fn fetch_impl<H: HttpHandler>(
    interceptor: &CachingInterceptor<H>, params: HttpFetchParams,
) -> Result<CallToolResult, McpError> {
    let mut request = build_request(&params.method, &params.url, params.params)?;
    if let Some(headers) = params.headers {
        request.headers = HttpHeaders::from_flat(headers);
    }
    if let Some(body) = params.body {
        request.body = body;
    }
    request.response_type = params.response_type;

    let intercepted = interceptor.intercept(&request).await?;
    let response = intercepted
        .response()
        .ok_or_else(|| Error::HttpError(format!("no response for {} {}", request.method, request.url)))?;

    let output = HttpFetchOutput {
        cached: intercepted.cached,
        status: response.status,
        status_text: response.status_text.clone(),
        ok: response.ok,
        url: response.url.clone(),
        headers: response.headers.to_flat(),
        body: response.body.clone(),
    };

    json_result(&output)
}
