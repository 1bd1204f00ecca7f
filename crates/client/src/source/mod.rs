//! Authoritative content sources.
//!
//! A [`ContentSource`] answers one exact (date, cohort) question. Cohort
//! fallback lives above it in [`crate::ContentResolver`].

pub mod error;
pub mod http;
pub mod legacy;
pub mod response;

pub use error::ResolveError;
pub use http::{HttpSource, HttpSourceConfig};
pub use legacy::LegacySource;
pub use response::{ResolvedFrom, normalize_record};

use async_trait::async_trait;
use refill_core::ContentRecord;
use serde::Serialize;

/// Result of a lookup the source could answer.
///
/// `content: None` is a legitimate "nothing published" answer, distinct from
/// a [`ResolveError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookup {
    pub content: Option<ContentRecord>,
    pub resolved_from: ResolvedFrom,
}

impl Lookup {
    pub fn none() -> Self {
        Self { content: None, resolved_from: ResolvedFrom::None }
    }

    pub fn found(content: ContentRecord, resolved_from: ResolvedFrom) -> Self {
        Self { content: Some(content), resolved_from }
    }
}

/// Exact-pair content lookup.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Content published for exactly (`date`, `cohort`).
    async fn lookup(&self, date: &str, cohort: &str) -> Result<Lookup, ResolveError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
