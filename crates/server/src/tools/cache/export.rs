//! cache_export tool implementation.
//!
//! Serializes the whole cache and optionally writes it as a snapshot file.

use std::path::PathBuf;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use replay_client::SharedStore;
use replay_core::AppConfig;
use replay_core::cache::{SerializedCacheEntry, snapshots};

/// Parameters for the cache_export tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheExportParams {
    /// File to write the snapshot to. Falls back to the configured export path;
    /// with neither, the snapshot is only returned.
    #[serde(default)]
    pub path: Option<String>,
}

/// Output from the cache_export tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheExportOutput {
    /// Number of entries exported.
    pub entries: usize,
    /// Where the snapshot was written, if anywhere.
    pub path: Option<String>,
    pub snapshot: Vec<SerializedCacheEntry>,
}

/// Implementation of the cache_export tool.
pub async fn export_impl(
    store: &SharedStore, config: &AppConfig, params: CacheExportParams,
) -> Result<CallToolResult, McpError> {
    let snapshot = store.lock().await.serialize();

    let path = params.path.map(PathBuf::from).or_else(|| config.export_path.clone());
    if let Some(path) = &path {
        snapshots::write_snapshot(&snapshot, path).await?;
    }

    let output = CacheExportOutput {
        entries: snapshot.len(),
        path: path.map(|p| p.display().to_string()),
        snapshot,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::result_json;
    use replay_core::cache::{HttpCacheStore, HttpEvent, HttpRequest, HttpResponse, snapshots::read_snapshot_file};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn store() -> SharedStore {
        let mut store = HttpCacheStore::default();
        for (path, status) in [("a", 200), ("b", 201)] {
            let request = HttpRequest::new("GET", format!("https://api.test/{path}"));
            store.insert(&request, &HttpEvent::Response(HttpResponse::new(status, json!(path))));
        }
        Arc::new(Mutex::new(store))
    }

    #[tokio::test]
    async fn test_export_without_path_returns_snapshot() {
        let result = export_impl(&store(), &AppConfig::default(), CacheExportParams::default()).await.unwrap();
        let output = result_json(&result);
        assert_eq!(output["entries"], 2);
        assert!(output["path"].is_null());
        assert_eq!(output["snapshot"][1]["request"]["url"], "https://api.test/b");
    }

    #[tokio::test]
    async fn test_export_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let params = CacheExportParams { path: Some(path.display().to_string()) };

        let result = export_impl(&store(), &AppConfig::default(), params).await.unwrap();
        assert_eq!(result_json(&result)["path"], path.display().to_string());

        let entries = read_snapshot_file(&path).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].response.status, 201);
    }

    #[tokio::test]
    async fn test_export_to_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configured.json");
        let config = AppConfig { export_path: Some(path.clone()), ..Default::default() };

        export_impl(&store(), &config, CacheExportParams::default()).await.unwrap();
        assert_eq!(read_snapshot_file(&path).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_export_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let params = CacheExportParams { path: Some(dir.path().join("missing/out.json").display().to_string()) };
        let err = export_impl(&store(), &AppConfig::default(), params).await.unwrap_err();
        assert_eq!(err.code.0, -32002);
    }
}
