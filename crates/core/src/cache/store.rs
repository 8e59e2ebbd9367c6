//! In-memory HTTP response store.
//!
//! Entries are kept in insertion order, never deduplicated and never
//! evicted. Nothing here returns an error: a lookup that cannot be served
//! is a miss and a removal that finds nothing is a no-op.

use std::fmt;

use super::codec::{self, SerializedCacheEntry};
use super::entry::{CacheEntry, HttpEvent, HttpRequest};
use super::matcher::{self, Fingerprint, ParamMatching};
use super::settings::CacheSettings;

/// Mutation notifications delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Sent once to a newly registered subscriber; carries the current entry count.
    Loaded(usize),
    /// An entry was appended at the given index.
    Inserted(usize),
    /// The entry at the given index was removed.
    Busted(usize),
    /// All entries were removed; carries how many there were.
    Cleared(usize),
}

type Listener = Box<dyn Fn(StoreEvent) + Send + Sync>;

/// Ordered collection of request/response pairs.
pub struct HttpCacheStore {
    settings: CacheSettings,
    entries: Vec<CacheEntry>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for HttpCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCacheStore")
            .field("settings", &self.settings)
            .field("entries", &self.entries.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for HttpCacheStore {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl HttpCacheStore {
    /// Create an empty store.
    pub fn new(settings: CacheSettings) -> Self {
        Self { settings, entries: Vec::new(), listeners: Vec::new() }
    }

    /// Create a store preloaded from a snapshot.
    ///
    /// Entries that fail to decode are skipped.
    pub fn with_snapshot(settings: CacheSettings, snapshot: Vec<SerializedCacheEntry>) -> Self {
        let total = snapshot.len();
        let entries = codec::decode_entries(snapshot.into_iter().map(codec::decode));
        tracing::info!(loaded = entries.len(), total, "initialized HTTP cache from snapshot");
        Self::with_entries(settings, entries)
    }

    /// Create a store from already decoded entries.
    pub fn with_entries(settings: CacheSettings, entries: Vec<CacheEntry>) -> Self {
        Self { settings, entries, listeners: Vec::new() }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a callback invoked after every mutation.
    ///
    /// Only the new callback receives [`StoreEvent::Loaded`].
    pub fn subscribe(&mut self, listener: impl Fn(StoreEvent) + Send + Sync + 'static) {
        listener(StoreEvent::Loaded(self.entries.len()));
        self.listeners.push(Box::new(listener));
    }

    /// First entry matching the fingerprint, in insertion order.
    pub fn find<'a>(&self, fingerprint: impl Into<Fingerprint<'a>>) -> Option<&CacheEntry> {
        let fingerprint = fingerprint.into();
        let found = matcher::find(&self.entries, &fingerprint, self.settings.param_matching);
        if self.settings.verbose {
            tracing::info!(request = %fingerprint, hit = found.is_some(), "checked HTTP cache");
        } else {
            tracing::debug!(request = %fingerprint, hit = found.is_some(), "checked HTTP cache");
        }
        found
    }

    pub fn has<'a>(&self, fingerprint: impl Into<Fingerprint<'a>>) -> bool {
        self.find(fingerprint).is_some()
    }

    /// Store the response for `request`.
    ///
    /// Anything other than a completed response event is ignored.
    pub fn insert(&mut self, request: &HttpRequest, event: &HttpEvent) {
        let Some(response) = event.as_response() else {
            tracing::trace!(kind = ?event.kind(), "ignoring non-terminal HTTP event");
            return;
        };

        let fingerprint = Fingerprint::from(request);
        if self.settings.verbose {
            tracing::info!(request = %fingerprint, status = response.status, "caching response");
        } else {
            tracing::debug!(request = %fingerprint, status = response.status, "caching response");
        }

        self.entries.push(CacheEntry { request: request.clone(), response: response.clone() });
        self.notify(StoreEvent::Inserted(self.entries.len() - 1));
    }

    /// Remove every entry.
    pub fn bust_all(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        if self.settings.verbose {
            tracing::info!(removed, "busted HTTP cache");
        }
        self.notify(StoreEvent::Cleared(removed));
    }

    /// Remove the first entry matching the fingerprint, if any.
    pub fn bust<'a>(&mut self, fingerprint: impl Into<Fingerprint<'a>>) -> Option<CacheEntry> {
        let fingerprint = fingerprint.into();
        let index = matcher::position(&self.entries, &fingerprint, self.settings.param_matching)?;
        let removed = self.entries.remove(index);
        if self.settings.verbose {
            tracing::info!(request = %fingerprint, index, "busted cached response");
        }
        self.notify(StoreEvent::Busted(index));
        Some(removed)
    }

    /// Snapshot of every entry, in insertion order.
    pub fn serialize(&self) -> Vec<SerializedCacheEntry> {
        self.entries.iter().map(codec::encode).collect()
    }

    fn notify(&self, event: StoreEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::HttpResponse;
    use crate::cache::params::HttpParams;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn request(url: &str) -> HttpRequest {
        HttpRequest::new("GET", url).with_params(HttpParams::new().append("page", "1"))
    }

    fn completed(body: serde_json::Value) -> HttpEvent {
        HttpEvent::Response(HttpResponse::new(200, body))
    }

    #[test]
    fn test_insert_then_find() {
        let mut store = HttpCacheStore::default();
        let req = request("/users");
        let event = completed(json!([{ "id": 1 }]));
        store.insert(&req, &event);

        let params = HttpParams::new().append("page", "1");
        let found = store.find(Fingerprint::new("GET", "/users", &params)).unwrap();
        assert_eq!(Some(&found.response), event.as_response());
        assert!(store.has(&req));
    }

    #[test]
    fn test_insert_ignores_progress_events() {
        let mut store = HttpCacheStore::default();
        let req = request("/users");
        store.insert(&req, &HttpEvent::Sent);
        store.insert(&req, &HttpEvent::DownloadProgress { loaded: 10, total: Some(100) });
        store.insert(&req, &HttpEvent::ResponseHeader { status: 200, headers: Default::default() });
        assert!(store.is_empty());
        assert!(!store.has(&req));
    }

    #[test]
    fn test_duplicates_are_kept_and_first_wins() {
        let mut store = HttpCacheStore::default();
        let req = request("/users");
        store.insert(&req, &completed(json!("first")));
        store.insert(&req, &completed(json!("second")));
        assert_eq!(store.len(), 2);
        assert_eq!(store.find(&req).unwrap().response.body, json!("first"));
    }

    #[test]
    fn test_bust_all() {
        let mut store = HttpCacheStore::default();
        store.insert(&request("/a"), &completed(json!(1)));
        store.insert(&request("/b"), &completed(json!(2)));
        store.bust_all();
        assert!(store.is_empty());
        assert!(!store.has(&request("/a")));
        assert!(!store.has(&request("/b")));
    }

    #[test]
    fn test_bust_one_leaves_others() {
        let mut store = HttpCacheStore::default();
        store.insert(&request("/a"), &completed(json!(1)));
        store.insert(&request("/b"), &completed(json!(2)));
        store.insert(&request("/b"), &completed(json!(3)));
        store.insert(&request("/c"), &completed(json!(4)));

        let removed = store.bust(&request("/b")).unwrap();
        assert_eq!(removed.response.body, json!(2));
        assert_eq!(store.len(), 3);
        let bodies: Vec<_> = store.entries().iter().map(|e| e.response.body.clone()).collect();
        assert_eq!(bodies, vec![json!(1), json!(3), json!(4)]);
    }

    #[test]
    fn test_bust_unmatched_is_noop() {
        let mut store = HttpCacheStore::default();
        store.insert(&request("/a"), &completed(json!(1)));
        assert!(store.bust(&request("/missing")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_serialize_preserves_order_and_reloads() {
        let mut store = HttpCacheStore::default();
        store.insert(&request("/a"), &completed(json!(1)));
        store.insert(&request("/b"), &completed(json!(2)));
        let snapshot = store.serialize();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].request.url, "/a");
        assert_eq!(snapshot[1].request.url, "/b");

        let reloaded = HttpCacheStore::with_snapshot(CacheSettings::default(), snapshot);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.find(&request("/b")).unwrap().response.body, json!(2));
    }

    #[test]
    fn test_with_snapshot_skips_undecodable_entries() {
        let mut store = HttpCacheStore::default();
        store.insert(&request("/a"), &completed(json!(1)));
        let mut snapshot = store.serialize();
        let mut broken = snapshot[0].clone();
        broken.response.kind = 1;
        snapshot.push(broken);

        let reloaded = HttpCacheStore::with_snapshot(CacheSettings::default(), snapshot);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut store = HttpCacheStore::default();
        store.subscribe(move |event| sink.lock().unwrap().push(event));

        store.insert(&request("/a"), &completed(json!(1)));
        store.insert(&request("/a"), &HttpEvent::Sent);
        store.bust(&request("/a"));
        store.bust(&request("/a"));
        store.bust_all();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![StoreEvent::Loaded(0), StoreEvent::Inserted(0), StoreEvent::Busted(0), StoreEvent::Cleared(0)]
        );
    }

    #[test]
    fn test_loaded_goes_to_new_subscriber_only() {
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        let (sink_a, sink_b) = (Arc::clone(&first), Arc::clone(&second));
        let mut store = HttpCacheStore::default();

        store.subscribe(move |event| sink_a.lock().unwrap().push(event));
        store.insert(&request("/a"), &completed(json!(1)));
        store.subscribe(move |event| sink_b.lock().unwrap().push(event));
        store.bust_all();

        assert_eq!(
            *first.lock().unwrap(),
            vec![StoreEvent::Loaded(0), StoreEvent::Inserted(0), StoreEvent::Cleared(1)]
        );
        assert_eq!(*second.lock().unwrap(), vec![StoreEvent::Loaded(1), StoreEvent::Cleared(1)]);
    }

    #[test]
    fn test_keyed_matching_from_settings() {
        let settings = CacheSettings { param_matching: ParamMatching::Keyed, ..Default::default() };
        let mut store = HttpCacheStore::new(settings);
        store.insert(&request("/a"), &completed(json!(1)));

        let loose = HttpParams::new().append("page", "1").append("sort", "");
        assert!(store.has(Fingerprint::new("GET", "/a", &loose)));
    }
}
