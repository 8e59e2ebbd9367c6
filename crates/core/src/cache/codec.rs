//! Snapshot codec.
//!
//! Converts cache entries to and from the flat, JSON-safe layout used for
//! preloading and export. Headers become a sorted name → value(s) map and
//! parameters become the canonical query string, so a round trip preserves
//! every field up to header/parameter ordering.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::{CacheEntry, HttpEventType, HttpRequest, HttpResponse, ResponseType};
use super::headers::{FlatHeaders, HttpHeaders};
use super::params::HttpParams;
use crate::Error;

/// Per-entry encode/decode failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("response type {0} is not a completed response")]
    NotAResponse(u8),

    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("malformed entry: {0}")]
    Malformed(String),
}

/// Serialized request half of a snapshot entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SerializedRequest {
    pub method: String,
    pub url: String,
    /// Canonical query string, without the leading `?`.
    #[serde(default)]
    pub params: String,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub response_type: ResponseType,
    #[serde(default)]
    pub with_credentials: bool,
    #[serde(default)]
    pub url_with_params: String,
    #[serde(default)]
    pub headers: FlatHeaders,
}

/// Serialized response half of a snapshot entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SerializedResponse {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub url: Option<String>,
    pub ok: bool,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub headers: FlatHeaders,
}

/// Flat, JSON-safe projection of a [`CacheEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SerializedCacheEntry {
    pub request: SerializedRequest,
    pub response: SerializedResponse,
}

pub fn encode(entry: &CacheEntry) -> SerializedCacheEntry {
    let request = &entry.request;
    let response = &entry.response;
    SerializedCacheEntry {
        request: SerializedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            params: request.params.to_query_string(),
            body: request.body.clone(),
            response_type: request.response_type,
            with_credentials: request.with_credentials,
            url_with_params: request.url_with_params(),
            headers: request.headers.to_flat(),
        },
        response: SerializedResponse {
            status: response.status,
            status_text: response.status_text.clone(),
            url: response.url.clone(),
            ok: response.ok,
            kind: HttpEventType::Response.code(),
            body: response.body.clone(),
            headers: response.headers.to_flat(),
        },
    }
}

/// Rebuild a cache entry.
///
/// `urlWithParams` is derived data and is not consulted.
pub fn decode(serialized: SerializedCacheEntry) -> Result<CacheEntry, CodecError> {
    let SerializedCacheEntry { request, response } = serialized;

    if response.kind != HttpEventType::Response.code() {
        return Err(CodecError::NotAResponse(response.kind));
    }
    if request.method.is_empty() {
        return Err(CodecError::EmptyField("request.method"));
    }
    if request.url.is_empty() {
        return Err(CodecError::EmptyField("request.url"));
    }

    Ok(CacheEntry {
        request: HttpRequest {
            method: request.method,
            url: request.url,
            params: HttpParams::from_query_string(&request.params),
            headers: HttpHeaders::from_flat(request.headers),
            body: request.body,
            with_credentials: request.with_credentials,
            response_type: request.response_type,
        },
        response: HttpResponse {
            status: response.status,
            status_text: response.status_text,
            headers: HttpHeaders::from_flat(response.headers),
            body: response.body,
            url: response.url,
            ok: response.ok,
        },
    })
}

/// Decode one raw JSON element of a snapshot.
pub fn decode_value(value: Value) -> Result<CacheEntry, CodecError> {
    let serialized: SerializedCacheEntry =
        serde_json::from_value(value).map_err(|e| CodecError::Malformed(e.to_string()))?;
    decode(serialized)
}

/// Keep the entries that decoded, logging each failure by its position.
pub fn decode_entries<I>(results: I) -> Vec<CacheEntry>
where
    I: IntoIterator<Item = Result<CacheEntry, CodecError>>,
{
    let mut total = 0;
    let entries: Vec<CacheEntry> = results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| {
            total += 1;
            result.map_err(|e| tracing::warn!(index, error = %e, "skipping malformed snapshot entry")).ok()
        })
        .collect();

    if entries.len() < total {
        tracing::warn!(loaded = entries.len(), skipped = total - entries.len(), "snapshot partially loaded");
    }
    entries
}

/// Decode every element, skipping (and logging) the ones that fail.
pub fn decode_all(values: Vec<Value>) -> Vec<CacheEntry> {
    decode_entries(values.into_iter().map(decode_value))
}

/// Decode a snapshot document.
///
/// The document must be a JSON array; individual entries that fail to
/// decode are skipped.
pub fn decode_snapshot(json: &str) -> Result<Vec<CacheEntry>, Error> {
    let document: Value = serde_json::from_str(json).map_err(|e| Error::Snapshot(format!("invalid JSON: {e}")))?;
    match document {
        Value::Array(values) => Ok(decode_all(values)),
        other => Err(Error::Snapshot(format!("expected an array of entries, found {}", json_kind(&other)))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> CacheEntry {
        let request = HttpRequest {
            method: "POST".into(),
            url: "https://api.test/search".into(),
            params: HttpParams::new().append("tag", "b").append("page", "1").append("tag", "a"),
            headers: HttpHeaders::new().append("X-Req", "1").append("Accept", "application/json"),
            body: json!({ "query": "rust", "filters": [] }),
            with_credentials: true,
            response_type: ResponseType::Json,
        };
        let response = HttpResponse::new(200, json!({ "hits": [1, 2, 3] }))
            .with_headers(
                HttpHeaders::new()
                    .append("Set-Cookie", "a=1")
                    .append("Set-Cookie", "b=2")
                    .append("Content-Type", "application/json"),
            )
            .with_url("https://api.test/search?page=1");
        CacheEntry { request, response }
    }

    #[test]
    fn test_encode_layout() {
        let encoded = encode(&sample_entry());
        let value = serde_json::to_value(&encoded).unwrap();

        assert_eq!(value["request"]["method"], "POST");
        assert_eq!(value["request"]["params"], "page=1&tag=a&tag=b");
        assert_eq!(value["request"]["urlWithParams"], "https://api.test/search?page=1&tag=a&tag=b");
        assert_eq!(value["request"]["responseType"], "json");
        assert_eq!(value["request"]["withCredentials"], true);
        assert_eq!(value["request"]["headers"]["Accept"], "application/json");
        assert_eq!(value["response"]["type"], 4);
        assert_eq!(value["response"]["statusText"], "OK");
        assert_eq!(value["response"]["headers"]["Set-Cookie"], json!(["a=1", "b=2"]));
        assert_eq!(value["response"]["body"], json!({ "hits": [1, 2, 3] }));
    }

    #[test]
    fn test_round_trip_up_to_canonical_order() {
        let entry = sample_entry();
        let decoded = decode(encode(&entry)).unwrap();

        assert_eq!(decoded.request.method, entry.request.method);
        assert_eq!(decoded.request.url, entry.request.url);
        assert_eq!(decoded.request.params, entry.request.params.canonicalized());
        assert_eq!(decoded.request.headers, entry.request.headers.canonicalized());
        assert_eq!(decoded.request.body, entry.request.body);
        assert_eq!(decoded.request.with_credentials, entry.request.with_credentials);
        assert_eq!(decoded.request.response_type, entry.request.response_type);
        assert_eq!(decoded.response.headers, entry.response.headers.canonicalized());
        assert_eq!(decoded.response.status, entry.response.status);
        assert_eq!(decoded.response.url, entry.response.url);
        assert_eq!(decoded.response.body, entry.response.body);

        // a second trip is stable
        assert_eq!(decode(encode(&decoded)).unwrap(), decoded);
    }

    #[test]
    fn test_decode_rejects_progress_event() {
        let mut encoded = encode(&sample_entry());
        encoded.response.kind = HttpEventType::DownloadProgress.code();
        assert_eq!(decode(encoded), Err(CodecError::NotAResponse(3)));
    }

    #[test]
    fn test_decode_rejects_empty_method() {
        let mut encoded = encode(&sample_entry());
        encoded.request.method.clear();
        assert!(matches!(decode(encoded), Err(CodecError::EmptyField("request.method"))));
    }

    #[test]
    fn test_decode_value_malformed() {
        let result = decode_value(json!({ "request": { "url": "/x" } }));
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_decode_minimal_entry_uses_defaults() {
        let entry = decode_value(json!({
            "request": { "method": "GET", "url": "/ping" },
            "response": { "status": 200, "ok": true, "type": 4 }
        }))
        .unwrap();
        assert!(entry.request.params.is_empty());
        assert_eq!(entry.request.response_type, ResponseType::Json);
        assert_eq!(entry.response.body, Value::Null);
    }

    #[test]
    fn test_decode_snapshot_skips_bad_entries() {
        let good = serde_json::to_value(encode(&sample_entry())).unwrap();
        let document = json!([good.clone(), { "nonsense": true }, 42, good]).to_string();
        let entries = decode_snapshot(&document).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_decode_entries_keeps_order_of_survivors() {
        let first = sample_entry();
        let mut second = sample_entry();
        second.request.url = "https://api.test/other".into();
        let results = vec![Ok(first.clone()), Err(CodecError::NotAResponse(1)), Ok(second.clone())];

        assert_eq!(decode_entries(results), vec![first, second]);
    }

    #[test]
    fn test_decode_snapshot_requires_array() {
        assert!(matches!(decode_snapshot(r#"{"request":{}}"#), Err(Error::Snapshot(msg)) if msg.contains("an object")));
        assert!(matches!(decode_snapshot("not json"), Err(Error::Snapshot(_))));
        assert!(decode_snapshot("[]").unwrap().is_empty());
    }
}
