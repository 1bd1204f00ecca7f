//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from:
//!
//! 1. Environment variables (REFILL_*)
//! 2. TOML config file (if REFILL_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::FingerprintAlgorithm;
use crate::cache::retention::DEFAULT_RETENTION_DAYS;

mod validation;

pub use validation::ConfigError;

/// Where authoritative daily content comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Hosted daily-content API.
    #[default]
    Http,
    /// Legacy JSON content file.
    Legacy,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (REFILL_*)
/// 2. TOML config file (if REFILL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the content API; `/content/daily` is appended.
    ///
    /// Set via REFILL_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path to the SQLite device store.
    ///
    /// Set via REFILL_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for API requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// API request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Content source implementation.
    ///
    /// Set via REFILL_RESOLVER (`http` or `legacy`).
    #[serde(default)]
    pub resolver: ResolverKind,

    /// Legacy content file, required when `resolver = "legacy"`.
    #[serde(default)]
    pub legacy_contents_path: Option<PathBuf>,

    /// Days of bundles kept on device.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Past dates within this many days are refreshed in the background.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: u32,

    /// Fingerprint algorithm for content ids (`wide` or `djb2`).
    #[serde(default)]
    pub fingerprint: FingerprintAlgorithm,

    /// Offset used to decide "today" (KST by default).
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./refill-store.sqlite")
}

fn default_user_agent() -> String {
    "knowledge-refill/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_recent_window_days() -> u32 {
    7
}

fn default_utc_offset_hours() -> i32 {
    9
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            resolver: ResolverKind::default(),
            legacy_contents_path: None,
            retention_days: default_retention_days(),
            recent_window_days: default_recent_window_days(),
            fingerprint: FingerprintAlgorithm::default(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("REFILL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("REFILL_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Legacy content path, required for the legacy resolver.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the path is not set.
    pub fn require_legacy_contents_path(&self) -> Result<&PathBuf, ConfigError> {
        self.legacy_contents_path.as_ref().ok_or_else(|| ConfigError::Missing {
            field: "legacy_contents_path".into(),
            hint: "Set REFILL_LEGACY_CONTENTS_PATH environment variable".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.db_path, PathBuf::from("./refill-store.sqlite"));
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.resolver, ResolverKind::Http);
        assert_eq!(config.retention_days, 90);
        assert_eq!(config.recent_window_days, 7);
        assert_eq!(config.fingerprint, FingerprintAlgorithm::Wide);
        assert_eq!(config.utc_offset_hours, 9);
        assert!(config.legacy_contents_path.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        let toml = r#"
            resolver = "legacy"
            legacy_contents_path = "./contents.json"
            fingerprint = "djb2"
            retention_days = 30
        "#;
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(toml));
        let config = AppConfig::extract(figment).unwrap();

        assert_eq!(config.resolver, ResolverKind::Legacy);
        assert_eq!(config.fingerprint, FingerprintAlgorithm::Djb2);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
    }

    #[test]
    fn test_require_legacy_path_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_legacy_contents_path(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_legacy_path_present() {
        let config = AppConfig { legacy_contents_path: Some("./contents.json".into()), ..Default::default() };
        assert_eq!(config.require_legacy_contents_path().unwrap(), &PathBuf::from("./contents.json"));
    }
}
