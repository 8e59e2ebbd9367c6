//! Unified error types for replay.
//!
//! The store itself never fails; these errors belong to the surfaces around
//! it (snapshot files, the request path, and the MCP tools).

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::cache::codec::CodecError;

/// Unified error types for the replay workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty method).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No cache entry matches the requested fingerprint.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Snapshot file could not be read, written, or parsed as a whole.
    #[error("SNAPSHOT_ERROR: {0}")]
    Snapshot(String),

    /// A single cache entry could not be encoded or decoded.
    #[error("CODEC_ERROR: {0}")]
    Codec(#[from] CodecError),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// HTTP or network failure on the forwarding path.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Snapshot(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::Snapshot(msg) => (-32002, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::Codec(e) => (-32013, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
