//! Request/response descriptors and the events a request produces.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::headers::HttpHeaders;
use super::params::HttpParams;

/// How the response body should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Arraybuffer,
    Blob,
    #[default]
    Json,
    Text,
}

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Compared case-sensitively; not normalized.
    pub method: String,
    /// URL without its query string; query parameters live in `params`.
    pub url: String,
    pub params: HttpParams,
    pub headers: HttpHeaders,
    pub body: Value,
    pub with_credentials: bool,
    pub response_type: ResponseType,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            params: HttpParams::new(),
            headers: HttpHeaders::new(),
            body: Value::Null,
            with_credentials: false,
            response_type: ResponseType::default(),
        }
    }

    pub fn with_params(mut self, params: HttpParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// The URL with the canonical query string appended.
    pub fn url_with_params(&self) -> String {
        let query = self.params.to_query_string();
        if query.is_empty() {
            return self.url.clone();
        }
        match self.url.find('?') {
            None => format!("{}?{query}", self.url),
            Some(i) if i + 1 == self.url.len() || self.url.ends_with('&') => format!("{}{query}", self.url),
            Some(_) => format!("{}&{query}", self.url),
        }
    }
}

/// A completed HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HttpHeaders,
    pub body: Value,
    /// Final URL, when known.
    pub url: Option<String>,
    pub ok: bool,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            status_text: default_status_text(status).to_string(),
            headers: HttpHeaders::new(),
            body,
            url: None,
            ok: (200..300).contains(&status),
        }
    }

    pub fn with_headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

fn default_status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

/// Discriminator of an [`HttpEvent`]; the numeric values are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HttpEventType {
    Sent = 0,
    UploadProgress = 1,
    ResponseHeader = 2,
    DownloadProgress = 3,
    Response = 4,
    User = 5,
}

impl HttpEventType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Sent),
            1 => Some(Self::UploadProgress),
            2 => Some(Self::ResponseHeader),
            3 => Some(Self::DownloadProgress),
            4 => Some(Self::Response),
            5 => Some(Self::User),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A notification observed while a request is in flight.
///
/// Only [`HttpEvent::Response`] is terminal and cacheable.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpEvent {
    Sent,
    UploadProgress { loaded: u64, total: Option<u64> },
    ResponseHeader { status: u16, headers: HttpHeaders },
    DownloadProgress { loaded: u64, total: Option<u64> },
    Response(HttpResponse),
    User(Value),
}

impl HttpEvent {
    pub fn kind(&self) -> HttpEventType {
        match self {
            HttpEvent::Sent => HttpEventType::Sent,
            HttpEvent::UploadProgress { .. } => HttpEventType::UploadProgress,
            HttpEvent::ResponseHeader { .. } => HttpEventType::ResponseHeader,
            HttpEvent::DownloadProgress { .. } => HttpEventType::DownloadProgress,
            HttpEvent::Response(_) => HttpEventType::Response,
            HttpEvent::User(_) => HttpEventType::User,
        }
    }

    pub fn as_response(&self) -> Option<&HttpResponse> {
        match self {
            HttpEvent::Response(response) => Some(response),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<HttpResponse> {
        match self {
            HttpEvent::Response(response) => Some(response),
            _ => None,
        }
    }
}

/// A stored request/response pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub request: HttpRequest,
    pub response: HttpResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_with_params() {
        let req = HttpRequest::new("GET", "https://api.test/users");
        assert_eq!(req.url_with_params(), "https://api.test/users");

        let req = req.with_params(HttpParams::new().append("page", "2").append("q", "a b"));
        assert_eq!(req.url_with_params(), "https://api.test/users?page=2&q=a+b");

        let mut req = HttpRequest::new("GET", "https://api.test/users?fixed=1")
            .with_params(HttpParams::new().append("page", "2"));
        assert_eq!(req.url_with_params(), "https://api.test/users?fixed=1&page=2");

        req.url = "https://api.test/users?".into();
        assert_eq!(req.url_with_params(), "https://api.test/users?page=2");
    }

    #[test]
    fn test_response_ok_flag() {
        assert!(HttpResponse::new(204, Value::Null).ok);
        assert!(!HttpResponse::new(404, Value::Null).ok);
        assert_eq!(HttpResponse::new(404, Value::Null).status_text, "Not Found");
    }

    #[test]
    fn test_event_codes() {
        assert_eq!(HttpEventType::Response.code(), 4);
        assert_eq!(HttpEventType::from_code(3), Some(HttpEventType::DownloadProgress));
        assert_eq!(HttpEventType::from_code(9), None);
        assert_eq!(HttpEvent::Sent.kind(), HttpEventType::Sent);
        let done = HttpEvent::Response(HttpResponse::new(200, Value::Null));
        assert_eq!(done.kind(), HttpEventType::Response);
        assert!(done.as_response().is_some());
        assert!(HttpEvent::DownloadProgress { loaded: 1, total: None }.into_response().is_none());
    }

    #[test]
    fn test_response_type_serde() {
        assert_eq!(serde_json::to_string(&ResponseType::Arraybuffer).unwrap(), r#""arraybuffer""#);
        let parsed: ResponseType = serde_json::from_str(r#""text""#).unwrap();
        assert_eq!(parsed, ResponseType::Text);
    }
}
