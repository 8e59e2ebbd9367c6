//! Snapshot file loading and export.
//!
//! A snapshot file is a pretty-printed JSON array of serialized cache
//! entries. Reading tolerates individual malformed entries; writing replaces
//! the file atomically via a uniquely named temp file in the same directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::codec::{self, SerializedCacheEntry};
use super::entry::CacheEntry;
use super::store::HttpCacheStore;
use crate::Error;

/// Read and decode a snapshot file.
///
/// Fails only when the file cannot be read or is not a JSON array.
pub async fn read_snapshot_file(path: impl AsRef<Path>) -> Result<Vec<CacheEntry>, Error> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Snapshot(format!("failed to read {}: {e}", path.display())))?;
    let entries = codec::decode_snapshot(&json)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "read snapshot file");
    Ok(entries)
}

/// Render a snapshot as the persisted JSON document.
pub fn snapshot_to_json(snapshot: &[SerializedCacheEntry]) -> Result<String, Error> {
    serde_json::to_string_pretty(snapshot).map_err(|e| Error::Snapshot(format!("failed to serialize snapshot: {e}")))
}

/// Serialize the store and write it to `path`.
///
/// Returns the number of entries written.
pub async fn write_snapshot_file(store: &HttpCacheStore, path: impl AsRef<Path>) -> Result<usize, Error> {
    let snapshot = store.serialize();
    write_snapshot(&snapshot, path).await?;
    Ok(snapshot.len())
}

/// Write an already serialized snapshot to `path`.
///
/// Concurrent writers to the same path never share a temp file, and a
/// failed write leaves no temp file behind.
pub async fn write_snapshot(snapshot: &[SerializedCacheEntry], path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let json = snapshot_to_json(snapshot)?;

    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || persist_atomically(&target, json.as_bytes()))
        .await
        .map_err(|e| Error::Snapshot(format!("snapshot writer task failed: {e}")))??;

    tracing::info!(path = %path.display(), entries = snapshot.len(), "wrote snapshot file");
    Ok(())
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)
        .map_err(|e| Error::Snapshot(format!("failed to create temp file in {}: {e}", dir.display())))?;
    tmp.write_all(bytes)?;
    tmp.persist(path)
        .map_err(|e| Error::Snapshot(format!("failed to replace {}: {}", path.display(), e.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::{HttpEvent, HttpRequest, HttpResponse};
    use crate::cache::settings::CacheSettings;
    use serde_json::json;

    fn populated_store() -> HttpCacheStore {
        let mut store = HttpCacheStore::default();
        store.insert(&HttpRequest::new("GET", "/a"), &HttpEvent::Response(HttpResponse::new(200, json!("a"))));
        store.insert(&HttpRequest::new("GET", "/b"), &HttpEvent::Response(HttpResponse::new(404, json!(null))));
        store
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let written = write_snapshot_file(&populated_store(), &path).await.unwrap();
        assert_eq!(written, 2);

        let entries = read_snapshot_file(&path).await.unwrap();
        let reloaded = HttpCacheStore::with_entries(CacheSettings::default(), entries);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.find(&HttpRequest::new("GET", "/b")).unwrap().response.status, 404);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_snapshot_file(dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(Error::Snapshot(msg)) if msg.contains("nope.json")));
    }

    #[tokio::test]
    async fn test_read_tolerates_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let good = serde_json::to_value(&populated_store().serialize()[0]).unwrap();
        tokio::fs::write(&path, json!([good, { "request": null }]).to_string()).await.unwrap();

        let entries = read_snapshot_file(&path).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writes_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let snapshot = populated_store().serialize();

        let (first, second) = tokio::join!(write_snapshot(&snapshot, &path), write_snapshot(&snapshot[..1], &path));
        assert!(first.is_ok());
        assert!(second.is_ok());

        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("cache.json")]);
        let len = read_snapshot_file(&path).await.unwrap().len();
        assert!(len == 1 || len == 2);
    }

    #[tokio::test]
    async fn test_failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        std::fs::create_dir_all(target.join("child")).unwrap();

        let result = write_snapshot(&populated_store().serialize(), &target).await;
        assert!(matches!(result, Err(Error::Snapshot(msg)) if msg.contains("occupied")));

        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("occupied")]);
    }

    #[test]
    fn test_snapshot_json_is_array() {
        let json = snapshot_to_json(&populated_store().serialize()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["response"]["type"], 4);
    }
}
