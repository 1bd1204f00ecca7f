//! Bundle reads, writes and cascade deletes.
//!
//! Store failures never escape this layer: a failed read is a miss and a
//! failed write is dropped with a warning, so the reader degrades to
//! "always refetch" instead of erroring.

use std::sync::Arc;

use crate::cache::hash::FingerprintAlgorithm;
use crate::content::{BUNDLE_PREFIX, DailyBundle, bundle_key, read_key};
use crate::store::KvStore;

/// Keyed access to [`DailyBundle`] snapshots.
#[derive(Clone)]
pub struct BundleStore {
    kv: Arc<dyn KvStore>,
    algorithm: FingerprintAlgorithm,
}

impl BundleStore {
    pub fn new(kv: Arc<dyn KvStore>, algorithm: FingerprintAlgorithm) -> Self {
        Self { kv, algorithm }
    }

    /// The underlying device store.
    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    /// Fingerprint algorithm for bundles built against this store.
    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    /// Look up `bundle:{date}:{cohort}`.
    ///
    /// Missing keys, unparseable JSON, and bundles whose fields disagree with
    /// their key are all treated as a miss.
    pub async fn read(&self, date: &str, cohort: &str) -> Option<DailyBundle> {
        let key = bundle_key(date, cohort);
        let raw = match self.kv.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(%key, error = %e, "bundle read failed");
                return None;
            }
        };

        match serde_json::from_str::<DailyBundle>(&raw) {
            Ok(bundle) if bundle.date == date && bundle.cohort == cohort && bundle.is_consistent() => Some(bundle),
            Ok(_) => {
                tracing::debug!(%key, "bundle fields disagree with key, treating as miss");
                None
            }
            Err(e) => {
                tracing::debug!(%key, error = %e, "corrupt bundle, treating as miss");
                None
            }
        }
    }

    /// Store `bundle` under its own key, overwriting any previous snapshot.
    pub async fn write(&self, bundle: &DailyBundle) {
        let key = bundle.key();
        let json = match serde_json::to_string(bundle) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(%key, error = %e, "bundle serialization failed");
                return;
            }
        };
        if let Err(e) = self.kv.set(&key, &json).await {
            tracing::warn!(%key, error = %e, "bundle write failed");
        }
    }

    /// Cached bundle, or a persisted empty placeholder. Never touches the network.
    pub async fn get_or_create(&self, date: &str, cohort: &str) -> DailyBundle {
        if let Some(bundle) = self.read(date, cohort).await {
            return bundle;
        }
        let empty = DailyBundle::empty(date, cohort);
        self.write(&empty).await;
        empty
    }

    /// Remove a bundle and the read flag tied to its content id.
    pub async fn delete_cascade(&self, date: &str, cohort: &str) {
        self.delete_key_cascade(&bundle_key(date, cohort)).await;
    }

    /// Cascade-delete by raw storage key. Returns whether a bundle was present.
    ///
    /// The read flag goes first; if the process stops between the two removes,
    /// the leftover is an orphaned flag, never a bundle pointing at nothing.
    pub async fn delete_key_cascade(&self, key: &str) -> bool {
        let raw = match self.kv.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%key, error = %e, "bundle lookup before delete failed");
                None
            }
        };
        let existed = raw.is_some();

        if let Some(content_id) = raw.as_deref().and_then(stored_content_id) {
            let rk = read_key(&content_id);
            if let Err(e) = self.kv.remove(&rk).await {
                tracing::warn!(key = %rk, error = %e, "read flag delete failed");
            }
        }

        if let Err(e) = self.kv.remove(key).await {
            tracing::warn!(%key, error = %e, "bundle delete failed");
        }
        existed
    }

    /// Every `bundle:` key currently stored. Empty on store failure.
    pub async fn bundle_keys(&self) -> Vec<String> {
        match self.kv.keys_with_prefix(BUNDLE_PREFIX).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "bundle key enumeration failed");
                Vec::new()
            }
        }
    }

    /// Raw stored JSON for a key, if readable.
    pub(crate) async fn raw(&self, key: &str) -> Option<String> {
        self.kv.get(key).await.ok().flatten()
    }
}

/// Extract a non-empty `contentId` from stored JSON without requiring the
/// rest of the bundle to parse.
pub(crate) fn stored_content_id(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value
        .get("contentId")
        .and_then(serde_json::Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentRecord, Sections};
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, BundleStore) {
        let kv = Arc::new(MemoryStore::new());
        let bundles = BundleStore::new(kv.clone(), FingerprintAlgorithm::Wide);
        (kv, bundles)
    }

    fn full(date: &str, cohort: &str) -> DailyBundle {
        let content = ContentRecord {
            title: Some("T".into()),
            sections: Sections { past: "P".into(), change: "C".into(), detail: "D".into() },
            ..Default::default()
        };
        DailyBundle::resolved(date, cohort, content, FingerprintAlgorithm::Wide)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (_kv, bundles) = setup();
        let bundle = full("2026-01-19", "1990s");
        bundles.write(&bundle).await;
        bundles.write(&bundle).await;

        assert_eq!(bundles.read("2026-01-19", "1990s").await, Some(bundle));
        assert!(bundles.read("2026-01-19", "common").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_json_is_miss() {
        let (kv, bundles) = setup();
        kv.set("bundle:2026-01-19:1990s", "{not json").await.unwrap();
        assert!(bundles.read("2026-01-19", "1990s").await.is_none());
    }

    #[tokio::test]
    async fn test_inconsistent_bundle_is_miss() {
        let (kv, bundles) = setup();
        kv.set(
            "bundle:2026-01-19:1990s",
            r#"{"date":"2026-01-19","cohort":"1990s","contentId":"x","content":null}"#,
        )
        .await
        .unwrap();
        assert!(bundles.read("2026-01-19", "1990s").await.is_none());

        kv.set(
            "bundle:2026-01-19:1990s",
            r#"{"date":"2026-01-20","cohort":"1990s","contentId":null,"content":null}"#,
        )
        .await
        .unwrap();
        assert!(bundles.read("2026-01-19", "1990s").await.is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_persists_placeholder() {
        let (kv, bundles) = setup();
        let created = bundles.get_or_create("2026-01-19", "1990s").await;
        assert!(created.is_empty());
        assert!(kv.get("bundle:2026-01-19:1990s").await.unwrap().is_some());

        let existing = full("2026-01-18", "1990s");
        bundles.write(&existing).await;
        assert_eq!(bundles.get_or_create("2026-01-18", "1990s").await, existing);
    }

    #[tokio::test]
    async fn test_delete_cascade_removes_read_flag() {
        let (kv, bundles) = setup();
        let bundle = full("2026-01-19", "1990s");
        bundles.write(&bundle).await;
        let rk = bundle.read_key().unwrap();
        kv.set(&rk, "1").await.unwrap();

        bundles.delete_cascade("2026-01-19", "1990s").await;

        assert!(kv.get("bundle:2026-01-19:1990s").await.unwrap().is_none());
        assert!(kv.get(&rk).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascade_missing_is_noop() {
        let (kv, bundles) = setup();
        kv.set("read:unrelated", "1").await.unwrap();
        bundles.delete_cascade("2026-01-19", "1990s").await;
        assert_eq!(kv.get("read:unrelated").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades() {
        let (kv, bundles) = setup();
        kv.set_unavailable(true);

        bundles.write(&full("2026-01-19", "1990s")).await;
        assert!(bundles.read("2026-01-19", "1990s").await.is_none());
        assert!(bundles.get_or_create("2026-01-19", "1990s").await.is_empty());
        assert!(bundles.bundle_keys().await.is_empty());
    }

    #[test]
    fn test_stored_content_id() {
        assert_eq!(stored_content_id(r#"{"contentId":"a:b:c"}"#).as_deref(), Some("a:b:c"));
        assert!(stored_content_id(r#"{"contentId":""}"#).is_none());
        assert!(stored_content_id(r#"{"contentId":null}"#).is_none());
        assert!(stored_content_id("garbage").is_none());
    }
}
