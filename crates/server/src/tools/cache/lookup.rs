//! cache_lookup tool implementation.
//!
//! Retrieves the stored entry for a request fingerprint without forwarding.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{ParamMap, build_request, json_result};
use replay_client::SharedStore;
use replay_core::Error;
use replay_core::cache::{Fingerprint, codec};

/// Parameters for the cache_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheLookupParams {
    /// HTTP method of the stored request.
    pub method: String,

    /// URL of the stored request. Any query string is folded into `params`.
    pub url: String,

    /// Query parameters: name to a value or list of values.
    #[serde(default)]
    pub params: Option<ParamMap>,
}

/// Implementation of the cache_lookup tool.
pub async fn lookup_impl(store: &SharedStore, params: CacheLookupParams) -> Result<CallToolResult, McpError> {
    let request = build_request(&params.method, &params.url, params.params)?;

    let entry = {
        let store = store.lock().await;
        store.find(&request).map(codec::encode)
    };
    let entry = entry.ok_or_else(|| Error::CacheMiss(Fingerprint::from(&request).to_string()))?;

    json_result(&entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::result_json;
    use replay_core::cache::{HttpCacheStore, HttpEvent, HttpParams, HttpRequest, HttpResponse};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn store() -> SharedStore {
        let mut store = HttpCacheStore::default();
        let request =
            HttpRequest::new("GET", "https://api.test/users").with_params(HttpParams::new().append("page", "2"));
        store.insert(&request, &HttpEvent::Response(HttpResponse::new(200, json!([{ "id": 7 }]))));
        Arc::new(Mutex::new(store))
    }

    #[tokio::test]
    async fn test_lookup_impl_found() {
        let params =
            CacheLookupParams { method: "GET".into(), url: "https://api.test/users?page=2".into(), params: None };
        let result = lookup_impl(&store(), params).await.unwrap();

        let entry = result_json(&result);
        assert_eq!(entry["request"]["params"], "page=2");
        assert_eq!(entry["response"]["type"], 4);
        assert_eq!(entry["response"]["body"], json!([{ "id": 7 }]));
    }

    #[tokio::test]
    async fn test_lookup_impl_missing() {
        let params = CacheLookupParams { method: "GET".into(), url: "https://api.test/users".into(), params: None };
        let err = lookup_impl(&store(), params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
        assert!(err.message.contains("https://api.test/users"));
    }

    #[tokio::test]
    async fn test_lookup_impl_empty_method() {
        let params = CacheLookupParams { method: String::new(), url: "https://api.test/users".into(), params: None };
        assert_eq!(lookup_impl(&store(), params).await.unwrap_err().code.0, -32602);
    }
}
