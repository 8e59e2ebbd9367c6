//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (REPLAY_*)
//! 2. TOML config file (if REPLAY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheSettings, ParamMatching};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (REPLAY_*)
/// 2. TOML config file (if REPLAY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Whether requests are served from and recorded into the cache.
    ///
    /// Set via REPLAY_ENABLE_INTERCEPTOR environment variable.
    #[serde(default = "default_true")]
    pub enable_interceptor: bool,

    /// Serve only stored responses; misses fail instead of reaching the network.
    ///
    /// Set via REPLAY_ONLY_USE_CACHE environment variable.
    #[serde(default)]
    pub only_use_cache: bool,

    /// Log cache hits, misses and busts at info level.
    ///
    /// Set via REPLAY_VERBOSE environment variable.
    #[serde(default)]
    pub verbose: bool,

    /// How query parameters are compared: "pairs" or "keyed".
    ///
    /// Set via REPLAY_PARAM_MATCHING environment variable.
    #[serde(default)]
    pub param_matching: ParamMatching,

    /// Snapshot file to preload at startup.
    ///
    /// Set via REPLAY_SNAPSHOT_PATH environment variable.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Default destination for exported snapshots.
    ///
    /// Set via REPLAY_EXPORT_PATH environment variable.
    #[serde(default)]
    pub export_path: Option<PathBuf>,

    /// User-Agent string for forwarded requests.
    ///
    /// Set via REPLAY_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Forwarded request timeout in milliseconds.
    ///
    /// Set via REPLAY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_user_agent() -> String {
    "replay/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_interceptor: true,
            only_use_cache: false,
            verbose: false,
            param_matching: ParamMatching::default(),
            snapshot_path: None,
            export_path: None,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The subset of settings the store and interceptor consume.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            enable_interceptor: self.enable_interceptor,
            only_use_cache: self.only_use_cache,
            verbose: self.verbose,
            param_matching: self.param_matching,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `REPLAY_`
    /// 2. TOML file from `REPLAY_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("REPLAY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("REPLAY_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
