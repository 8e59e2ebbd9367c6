//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `snapshot_path` or `export_path` is set to an empty path
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.snapshot_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid { field: "snapshot_path".into(), reason: "must not be empty".into() });
        }
        if self.export_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid { field: "export_path".into(), reason: "must not be empty".into() });
        }

        if !self.enable_interceptor && self.snapshot_path.is_some() {
            tracing::warn!(
                snapshot_path = ?self.snapshot_path,
                "snapshot_path is set but enable_interceptor is false; \
                 preloaded responses will only be reachable through the cache tools"
            );
        }

        if !self.enable_interceptor && self.only_use_cache {
            tracing::warn!("only_use_cache has no effect while enable_interceptor is false; requests are forwarded");
        }

        Ok(())
    }
}
