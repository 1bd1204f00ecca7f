//! Bundle invalidation.
//!
//! All entry points cascade-delete (bundle plus its read flag) and record a
//! diagnostic reason under [`META_LAST_INVALIDATION_REASON`]. Date bounds are
//! compared as zero-padded `YYYY-MM-DD` strings.

use crate::cache::bundle::BundleStore;
use crate::cache::{META_CONTENT_VERSION, META_LAST_INVALIDATION_REASON};
use crate::calendar::FAR_FUTURE;
use crate::content::parse_bundle_key;

/// Invalidation entry points over a [`BundleStore`].
#[derive(Clone)]
pub struct Invalidator {
    bundles: BundleStore,
}

impl Invalidator {
    pub fn new(bundles: BundleStore) -> Self {
        Self { bundles }
    }

    /// Cascade-delete exactly one bundle. Returns whether it existed.
    pub async fn invalidate_one(&self, date: &str, cohort: &str, reason: Option<&str>) -> bool {
        let existed = self
            .bundles
            .delete_key_cascade(&crate::content::bundle_key(date, cohort))
            .await;

        let tag = format!("single:{date}:{cohort}");
        self.record_reason(&with_reason(tag, reason)).await;
        tracing::info!(date, cohort, existed, "invalidated bundle");
        existed
    }

    /// Cascade-delete every bundle with `start <= date <= end`, optionally
    /// limited to one cohort. Keys that don't parse are skipped.
    pub async fn invalidate_range(&self, start: &str, end: &str, cohort: Option<&str>, reason: Option<&str>) -> usize {
        let mut deleted = 0;
        for key in self.bundles.bundle_keys().await {
            let Some((date, key_cohort)) = parse_bundle_key(&key) else {
                continue;
            };
            if cohort.is_some_and(|c| c != key_cohort) {
                continue;
            }
            if date < start || date > end {
                continue;
            }
            if self.bundles.delete_key_cascade(&key).await {
                deleted += 1;
            }
        }

        let mut tag = format!("range:{start}..{end}");
        if let Some(c) = cohort {
            tag.push(':');
            tag.push_str(c);
        }
        self.record_reason(&with_reason(tag, reason)).await;
        tracing::info!(start, end, cohort, deleted, "invalidated bundle range");
        deleted
    }

    /// Cascade-delete every bundle. Emergency use only.
    pub async fn invalidate_all(&self, reason: &str) -> usize {
        let mut deleted = 0;
        for key in self.bundles.bundle_keys().await {
            if self.bundles.delete_key_cascade(&key).await {
                deleted += 1;
            }
        }
        self.record_reason(reason).await;
        tracing::info!(reason, deleted, "invalidated all bundles");
        deleted
    }

    /// Compare the persisted content version with `current`; on mismatch (or
    /// no marker), drop today's and future bundles and persist `current`.
    ///
    /// Past bundles are kept so read history stays stable. Returns whether an
    /// invalidation ran.
    pub async fn sync_version_and_invalidate_if_needed(&self, current: u32, today: &str) -> bool {
        let kv = self.bundles.kv();
        let previous = match kv.get(META_CONTENT_VERSION).await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(error = %e, "content version lookup failed, skipping sync");
                return false;
            }
        };

        let matches = previous
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .is_some_and(|p| p.is_finite() && p == f64::from(current));
        if matches {
            return false;
        }

        let reason = format!("contentVersion {} -> {current}", previous.as_deref().unwrap_or("(none)"));
        self.invalidate_range(today, FAR_FUTURE, None, Some(&reason)).await;

        if let Err(e) = kv.set(META_CONTENT_VERSION, &current.to_string()).await {
            tracing::warn!(error = %e, "content version persist failed");
        }
        true
    }

    /// Most recently recorded invalidation reason.
    pub async fn last_reason(&self) -> Option<String> {
        self.bundles.raw(META_LAST_INVALIDATION_REASON).await
    }

    async fn record_reason(&self, reason: &str) {
        if let Err(e) = self.bundles.kv().set(META_LAST_INVALIDATION_REASON, reason).await {
            tracing::debug!(error = %e, "invalidation reason not recorded");
        }
    }
}

fn with_reason(tag: String, reason: Option<&str>) -> String {
    match reason {
        Some(r) => format!("{tag} {r}"),
        None => tag,
    }
}
