//! Request fingerprinting.
//!
//! A fingerprint is method + URL (both compared exactly) + query parameters
//! (compared loosely). The parameter projection handed to the comparer is
//! selected by [`ParamMatching`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entry::{CacheEntry, HttpRequest};
use super::params::HttpParams;
use crate::compare::are_basically_equal;

/// How parameter sets are projected before loose comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamMatching {
    /// `[[key, value], ...]`, one pair per value in canonical order. Only a
    /// wholly empty set is interchangeable with another empty set.
    #[default]
    Pairs,
    /// `{key: [values]}`. Keys of the incoming request are walked, so a
    /// parameter whose values are all empty matches an absent one.
    Keyed,
}

impl ParamMatching {
    pub fn params_match(self, candidate: &HttpParams, stored: &HttpParams) -> bool {
        match self {
            ParamMatching::Pairs => are_basically_equal(&candidate.to_pairs_value(), &stored.to_pairs_value()),
            ParamMatching::Keyed => are_basically_equal(&candidate.to_keyed_value(), &stored.to_keyed_value()),
        }
    }
}

/// Normalized lookup descriptor.
///
/// Build one from a full request, or from separate method/url/params when
/// no request object is at hand.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprint<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub params: &'a HttpParams,
}

impl<'a> Fingerprint<'a> {
    pub fn new(method: &'a str, url: &'a str, params: &'a HttpParams) -> Self {
        Self { method, url, params }
    }

    pub fn matches(&self, entry: &CacheEntry, policy: ParamMatching) -> bool {
        entry.request.method == self.method
            && entry.request.url == self.url
            && policy.params_match(self.params, &entry.request.params)
    }
}

impl<'a> From<&'a HttpRequest> for Fingerprint<'a> {
    fn from(request: &'a HttpRequest) -> Self {
        Self { method: &request.method, url: &request.url, params: &request.params }
    }
}

impl std::fmt::Display for Fingerprint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query = self.params.to_query_string();
        if query.is_empty() {
            write!(f, "{} {}", self.method, self.url)
        } else {
            write!(f, "{} {}?{query}", self.method, self.url)
        }
    }
}

/// First entry matching `fingerprint`, in slice order.
pub fn find<'e>(
    entries: &'e [CacheEntry], fingerprint: &Fingerprint<'_>, policy: ParamMatching,
) -> Option<&'e CacheEntry> {
    entries.iter().find(|entry| fingerprint.matches(entry, policy))
}

/// Index of the first entry matching `fingerprint`.
pub fn position(entries: &[CacheEntry], fingerprint: &Fingerprint<'_>, policy: ParamMatching) -> Option<usize> {
    entries.iter().position(|entry| fingerprint.matches(entry, policy))
}
