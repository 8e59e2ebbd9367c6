//! Query parameter multi-map.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Ordered multi-map of query parameters.
///
/// Keys keep the order they were first added in and never map to an empty
/// value list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpParams {
    entries: Vec<(String, Vec<String>)>,
}

impl HttpParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. Repeated keys accumulate values.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.push(key.into_owned(), value.into_owned());
        }
        params
    }

    /// Builder form of [`HttpParams::push`].
    pub fn append(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Add a value to `key`, keeping existing values.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Replace all values of `key`. An empty list removes the key.
    pub fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        if values.is_empty() {
            self.remove(&key);
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// One `(key, value)` pair per value, sorted by key then value.
    pub fn canonical_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Canonical query string: pairs sorted by key then value, form encoded.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.canonical_pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// `[[key, value], ...]` in canonical order.
    pub fn to_pairs_value(&self) -> Value {
        Value::Array(
            self.canonical_pairs()
                .into_iter()
                .map(|(k, v)| Value::Array(vec![Value::String(k.to_string()), Value::String(v.to_string())]))
                .collect(),
        )
    }

    /// `{key: [values...]}`, keys in insertion order.
    pub fn to_keyed_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, values)| (k.clone(), Value::Array(values.iter().cloned().map(Value::String).collect())))
            .collect();
        Value::Object(map)
    }

    /// Copy with keys sorted and each key's values sorted.
    pub fn canonicalized(&self) -> Self {
        let mut entries = self.entries.clone();
        for (_, values) in &mut entries {
            values.sort();
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HttpParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.push(key, value);
        }
        params
    }
}
