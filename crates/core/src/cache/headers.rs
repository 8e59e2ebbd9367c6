//! Header multi-map with case-insensitive lookup.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A flattened header or query parameter value: one string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FlatValue {
    One(String),
    Many(Vec<String>),
}

impl FlatValue {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            FlatValue::One(v) => vec![v],
            FlatValue::Many(vs) => vs,
        }
    }
}

/// Header name to value(s) mapping, sorted by name.
pub type FlatHeaders = BTreeMap<String, FlatValue>;

/// Ordered header collection.
///
/// Names are matched case-insensitively and keep the casing they were first
/// added with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`HttpHeaders::push`].
    pub fn append(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.entries[i].1.as_slice())
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Flatten to a plain mapping; single values collapse to a string.
    pub fn to_flat(&self) -> FlatHeaders {
        self.entries
            .iter()
            .map(|(name, values)| {
                let value = match values.as_slice() {
                    [single] => FlatValue::One(single.clone()),
                    many => FlatValue::Many(many.to_vec()),
                };
                (name.clone(), value)
            })
            .collect()
    }

    pub fn from_flat(flat: FlatHeaders) -> Self {
        let mut headers = Self::new();
        for (name, value) in flat {
            for v in value.into_vec() {
                headers.push(name.clone(), v);
            }
        }
        headers
    }

    /// Copy with names in the order [`HttpHeaders::to_flat`] produces.
    pub fn canonicalized(&self) -> Self {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self { entries }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.push(name, value);
        }
        headers
    }
}
