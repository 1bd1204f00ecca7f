//! Content resolution for the knowledge-refill reader.
//!
//! This crate provides the content sources (hosted API and legacy file), the
//! resolver with common-cohort fallback, and the cache-first freshness policy
//! shared by the server.

pub mod policy;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod testing;

pub use policy::{DEFAULT_RECENT_WINDOW_DAYS, FreshnessPolicy, Plan, ReaderSession, Selection, View, ViewSource};
pub use resolver::ContentResolver;
pub use source::{
    ContentSource, HttpSource, HttpSourceConfig, LegacySource, Lookup, ResolveError, ResolvedFrom, normalize_record,
};

use std::sync::Arc;

use refill_core::{AppConfig, ResolverKind};

/// Build the content source selected by configuration.
///
/// # Errors
///
/// Returns `ResolveError` if the HTTP base URL is invalid or the legacy
/// resolver has no contents path.
pub fn source_from_config(config: &AppConfig) -> Result<Arc<dyn ContentSource>, ResolveError> {
    match config.resolver {
        ResolverKind::Http => Ok(Arc::new(HttpSource::new(HttpSourceConfig::from_app_config(config))?)),
        ResolverKind::Legacy => {
            let path = config
                .require_legacy_contents_path()
                .map_err(|e| ResolveError::Legacy(e.to_string()))?;
            Ok(Arc::new(LegacySource::new(path.clone())))
        }
    }
}
