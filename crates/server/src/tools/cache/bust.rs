//! cache_bust tool implementation.
//!
//! Removes the first entry matching a fingerprint, or every entry when no
//! method and URL are given.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{ParamMap, build_request, json_result};
use replay_client::SharedStore;
use replay_core::Error;

/// Parameters for the cache_bust tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheBustParams {
    /// HTTP method of the entry to remove. Omit together with `url` to clear the cache.
    #[serde(default)]
    pub method: Option<String>,

    /// URL of the entry to remove.
    #[serde(default)]
    pub url: Option<String>,

    /// Query parameters of the entry to remove.
    #[serde(default)]
    pub params: Option<ParamMap>,
}

/// Output from the cache_bust tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheBustOutput {
    /// Number of entries removed.
    pub removed: usize,
}

/// Implementation of the cache_bust tool.
pub async fn bust_impl(store: &SharedStore, params: CacheBustParams) -> Result<CallToolResult, McpError> {
    let removed = match (params.method, params.url) {
        (None, None) => {
            if params.params.is_some() {
                return Err(Error::InvalidInput("params require both method and url".into()).into());
            }
            let mut store = store.lock().await;
            let removed = store.len();
            store.bust_all();
            removed
        }
        (Some(method), Some(url)) => {
            let request = build_request(&method, &url, params.params)?;
            let mut store = store.lock().await;
            usize::from(store.bust(&request).is_some())
        }
        (None, Some(_)) => return Err(Error::InvalidInput("url requires a method".into()).into()),
        (Some(_), None) => return Err(Error::InvalidInput("method requires a url".into()).into()),
    };

    json_result(&CacheBustOutput { removed })
}
