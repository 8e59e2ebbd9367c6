//! MCP tool implementations.
//!
//! This module contains all tools exposed by the replay server.

pub mod cache;
pub mod http_fetch;

use std::collections::BTreeMap;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use replay_client::request_from_url;
use replay_core::Error;
use replay_core::cache::{FlatValue, HttpRequest};

/// Query parameters as accepted by the tools: name to value(s).
pub type ParamMap = BTreeMap<String, FlatValue>;

/// Build a request descriptor from tool input.
///
/// The URL is canonicalized and its query string merged with `extra`.
pub fn build_request(method: &str, url: &str, extra: Option<ParamMap>) -> Result<HttpRequest, Error> {
    if method.trim().is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()));
    }

    let mut request = request_from_url(method, url)?;
    for (key, value) in extra.unwrap_or_default() {
        for v in value.into_vec() {
            request.params.push(key.as_str(), v);
        }
    }
    Ok(request)
}

/// Render a tool output as pretty JSON text content.
pub fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Pull the JSON text back out of a tool result.
#[cfg(test)]
pub fn result_json(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
