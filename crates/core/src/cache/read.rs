//! Read tracking keyed by content fingerprint.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::cache::bundle::BundleStore;
use crate::calendar::format_ymd;
use crate::content::read_key;
use crate::store::StoreError;

const READ_MARK: &str = "1";

/// Read flags stored as `read:{contentId}` = `"1"`.
///
/// A flag is only ever set by an explicit user action. Because the key is the
/// fingerprint, an edited post gets a new id and shows as unread again.
#[derive(Clone)]
pub struct ReadTracker {
    bundles: BundleStore,
}

impl ReadTracker {
    pub fn new(bundles: BundleStore) -> Self {
        Self { bundles }
    }

    /// Whether `content_id` has been marked read. Store failures read as unread.
    pub async fn is_read(&self, content_id: &str) -> bool {
        match self.bundles.kv().get(&read_key(content_id)).await {
            Ok(value) => value.as_deref() == Some(READ_MARK),
            Err(e) => {
                tracing::warn!(content_id, error = %e, "read flag lookup failed");
                false
            }
        }
    }

    /// Mark `content_id` as read.
    pub async fn mark_read(&self, content_id: &str) -> Result<(), StoreError> {
        self.bundles.kv().set(&read_key(content_id), READ_MARK).await?;
        tracing::debug!(content_id, "marked read");
        Ok(())
    }

    /// Read state per date for a visible calendar range.
    ///
    /// Future dates are always unread and never get a bundle. Other dates go
    /// through `get_or_create`, so no network fetch is triggered per cell.
    pub async fn read_map(&self, dates: &[NaiveDate], cohort: &str, today: NaiveDate) -> BTreeMap<String, bool> {
        let mut out = BTreeMap::new();
        for date in dates {
            let ymd = format_ymd(*date);
            if *date > today {
                out.insert(ymd, false);
                continue;
            }
            let bundle = self.bundles.get_or_create(&ymd, cohort).await;
            let read = match bundle.content_id.as_deref() {
                Some(id) => self.is_read(id).await,
                None => false,
            };
            out.insert(ymd, read);
        }
        out
    }
}
