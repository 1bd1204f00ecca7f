//! Once-per-day retention sweep.

use chrono::NaiveDate;
use serde::Serialize;

use crate::cache::META_LAST_CLEANUP;
use crate::cache::bundle::{BundleStore, stored_content_id};
use crate::calendar::{format_ymd, subtract_days};
use crate::content::read_key;

/// Default number of days of bundles kept on device.
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// Result of a sweep attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Already ran today.
    Skipped,
    /// Ran; `deleted` bundles were older than `cutoff`.
    Swept { cutoff: String, deleted: usize },
}

/// Purges bundles (and their read flags) older than the retention window.
#[derive(Clone)]
pub struct RetentionSweep {
    bundles: BundleStore,
    retention_days: u32,
}

impl RetentionSweep {
    pub fn new(bundles: BundleStore, retention_days: u32) -> Self {
        Self { bundles, retention_days }
    }

    /// Sweep unless the cleanup marker already says `today`.
    ///
    /// The stored `date` field (not the key) decides age. Entries that can't be
    /// read or parsed are left alone.
    pub async fn run(&self, today: NaiveDate) -> SweepOutcome {
        let today_ymd = format_ymd(today);
        let kv = self.bundles.kv();

        match kv.get(META_LAST_CLEANUP).await {
            Ok(Some(last)) if last == today_ymd => return SweepOutcome::Skipped,
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "cleanup marker unreadable, sweeping anyway"),
        }

        let cutoff = format_ymd(subtract_days(today, self.retention_days));
        let mut deleted = 0;

        for key in self.bundles.bundle_keys().await {
            let Some(raw) = self.bundles.raw(&key).await else {
                continue;
            };
            let Some(date) = stored_date(&raw) else {
                tracing::debug!(%key, "skipping malformed bundle during sweep");
                continue;
            };
            if date.as_str() >= cutoff.as_str() {
                continue;
            }

            if let Some(content_id) = stored_content_id(&raw)
                && let Err(e) = kv.remove(&read_key(&content_id)).await
            {
                tracing::warn!(%key, error = %e, "read flag delete failed during sweep");
            }
            match kv.remove(&key).await {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!(%key, error = %e, "bundle delete failed during sweep"),
            }
        }

        if let Err(e) = kv.set(META_LAST_CLEANUP, &today_ymd).await {
            tracing::warn!(error = %e, "cleanup marker write failed");
        }

        tracing::info!(%cutoff, deleted, "retention sweep finished");
        SweepOutcome::Swept { cutoff, deleted }
    }
}

fn stored_date(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value.get("date").and_then(serde_json::Value::as_str).map(str::to_string)
}
