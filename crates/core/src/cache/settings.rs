//! Runtime settings consumed by the store and the interceptor.

use serde::{Deserialize, Serialize};

use super::matcher::ParamMatching;

/// Cache behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Whether the caching interceptor consults and fills the store.
    #[serde(default = "default_true")]
    pub enable_interceptor: bool,

    /// Never forward: a request the store cannot answer fails with a cache miss.
    #[serde(default)]
    pub only_use_cache: bool,

    /// Log every hit, miss, insert and bust at `info` instead of `debug`.
    #[serde(default)]
    pub verbose: bool,

    /// Parameter projection used when fingerprints are compared.
    #[serde(default)]
    pub param_matching: ParamMatching,
}

fn default_true() -> bool {
    true
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enable_interceptor: true,
            only_use_cache: false,
            verbose: false,
            param_matching: ParamMatching::default(),
        }
    }
}
