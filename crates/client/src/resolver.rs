//! Content resolution with cohort fallback.

use std::sync::Arc;

use refill_core::cohort::{COMMON_COHORT, is_common};

use crate::source::{ContentSource, Lookup, ResolvedFrom};

/// Resolves authoritative content for a (date, cohort), falling back to the
/// common cohort when the exact pair has nothing.
#[derive(Clone)]
pub struct ContentResolver {
    source: Arc<dyn ContentSource>,
}

impl ContentResolver {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Authoritative content for `date` and `cohort`.
    ///
    /// `Some` with `content: None` means nothing is published. `None` means
    /// the answer could not be determined (transport or parse failure).
    pub async fn fetch_daily(&self, date: &str, cohort: &str) -> Option<Lookup> {
        let primary = match self.source.lookup(date, cohort).await {
            Ok(lookup) => lookup,
            Err(e) => {
                tracing::warn!(source = self.source.name(), date, cohort, error = %e, "content lookup failed");
                return None;
            }
        };

        if primary.content.is_some() || is_common(cohort) {
            return Some(primary);
        }

        match self.source.lookup(date, COMMON_COHORT).await {
            Ok(Lookup { content: Some(content), .. }) => {
                tracing::debug!(date, cohort, "using common cohort content");
                Some(Lookup::found(content, ResolvedFrom::Common))
            }
            Ok(common) => Some(common),
            Err(e) => {
                tracing::debug!(date, error = %e, "common fallback lookup failed, keeping exact result");
                Some(primary)
            }
        }
    }
}
