//! Configuration validation rules.

use crate::config::{AppConfig, ResolverKind};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for out-of-range values and
    /// `ConfigError::Missing` when the legacy resolver has no content file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "api_base_url".into(),
                reason: "must be an http(s) URL".into(),
            });
        }

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

        if self.retention_days == 0 {
            return Err(ConfigError::Invalid { field: "retention_days".into(), reason: "must be at least 1".into() });
        }
        if self.recent_window_days > self.retention_days {
            return Err(ConfigError::Invalid {
                field: "recent_window_days".into(),
                reason: "must not exceed retention_days".into(),
            });
        }

        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::Invalid {
                field: "utc_offset_hours".into(),
                reason: "must be between -12 and 14".into(),
            });
        }

        if self.resolver == ResolverKind::Legacy {
            self.require_legacy_contents_path()?;
        } else if self.legacy_contents_path.is_some() {
            tracing::warn!("legacy_contents_path is set but resolver is http; the file is ignored");
        }

        Ok(())
    }
}
