//! Shared reader state behind the MCP tools.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use refill_client::{ContentResolver, ContentSource, FreshnessPolicy, ReaderSession, Selection};
use refill_core::cohort::{COMMON_COHORT, normalize_cohort};
use refill_core::{
    AppConfig, BundleStore, Error, Invalidator, KvStore, ReadTracker, ReaderSettings, RetentionSweep, SweepOutcome,
};

/// Everything one device-local reader needs.
pub struct ReaderState {
    policy: Arc<FreshnessPolicy>,
    /// One session per bundle key with an open in flight.
    sessions: Mutex<HashMap<String, Arc<ReaderSession>>>,
    /// How long a superseded open waits for the newer one to render.
    pub settle_timeout: Duration,
    pub bundles: BundleStore,
    pub reads: ReadTracker,
    pub invalidator: Invalidator,
    pub sweep: RetentionSweep,
    pub settings: ReaderSettings,
    utc_offset_hours: i32,
    fixed_today: Option<NaiveDate>,
}

impl ReaderState {
    pub fn new(kv: Arc<dyn KvStore>, source: Arc<dyn ContentSource>, config: &AppConfig) -> Self {
        let bundles = BundleStore::new(kv.clone(), config.fingerprint);
        let policy = FreshnessPolicy::new(bundles.clone(), ContentResolver::new(source), config.recent_window_days);

        Self {
            policy: Arc::new(policy),
            sessions: Mutex::new(HashMap::new()),
            settle_timeout: config.timeout() * 2,
            reads: ReadTracker::new(bundles.clone()),
            invalidator: Invalidator::new(bundles.clone()),
            sweep: RetentionSweep::new(bundles.clone(), config.retention_days),
            settings: ReaderSettings::new(kv),
            bundles,
            utc_offset_hours: config.utc_offset_hours,
            fixed_today: None,
        }
    }

    #[cfg(test)]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| refill_core::calendar::today_at_offset(self.utc_offset_hours))
    }

    /// Session for the selection's (date, cohort).
    ///
    /// Only opens of the same day and cohort supersede each other. Sessions no
    /// request holds any more are dropped here.
    pub fn session_for(&self, sel: &Selection) -> Arc<ReaderSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, session| Arc::strong_count(session) > 1);
        sessions
            .entry(sel.key())
            .or_insert_with(|| Arc::new(ReaderSession::new(self.policy.clone())))
            .clone()
    }

    /// App-load housekeeping: retention sweep, then content-version sync.
    pub async fn startup(&self, content_version: u32) -> (SweepOutcome, bool) {
        let today = self.today();
        let sweep = self.sweep.run(today).await;
        let invalidated = self
            .invalidator
            .sync_version_and_invalidate_if_needed(content_version, &refill_core::calendar::format_ymd(today))
            .await;
        (sweep, invalidated)
    }

    /// Viewed cohort: the explicit one, else the reader's own, else common.
    pub async fn resolve_cohort(&self, requested: Option<&str>) -> Result<String, Error> {
        match requested {
            Some(raw) => {
                let cohort = normalize_cohort(raw);
                if cohort.is_empty() {
                    return Err(Error::InvalidInput("cohort cannot be empty".into()));
                }
                Ok(cohort)
            }
            None => Ok(self
                .settings
                .own_cohort()
                .await
                .unwrap_or_else(|| COMMON_COHORT.to_string())),
        }
    }

    /// Selected date, defaulting to today.
    pub fn resolve_date(&self, requested: Option<&str>) -> Result<NaiveDate, Error> {
        match requested {
            Some(raw) => refill_core::calendar::parse_ymd(raw.trim()),
            None => Ok(self.today()),
        }
    }

    /// Whether `cohort` differs from the reader's own (read tracking disabled).
    pub async fn is_preview(&self, cohort: &str) -> bool {
        self.settings
            .own_cohort()
            .await
            .is_some_and(|own| own != cohort)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use refill_core::{CONTENT_VERSION, DailyBundle, FingerprintAlgorithm};

    #[tokio::test]
    async fn test_resolve_cohort_defaults() {
        let f = fixture();
        assert_eq!(f.state.resolve_cohort(None).await.unwrap(), "common");

        f.state.settings.set_birth_year(1994).await.unwrap();
        assert_eq!(f.state.resolve_cohort(None).await.unwrap(), "1990s");
        assert_eq!(f.state.resolve_cohort(Some(" 1980S\u{200B} ")).await.unwrap(), "1980s");
        assert!(f.state.resolve_cohort(Some("\u{FEFF} ")).await.is_err());
    }

    #[tokio::test]
    async fn test_preview_requires_known_own_cohort() {
        let f = fixture();
        assert!(!f.state.is_preview("1980s").await);

        f.state.settings.set_birth_year(1994).await.unwrap();
        assert!(f.state.is_preview("1980s").await);
        assert!(!f.state.is_preview("1990s").await);
    }

    #[tokio::test]
    async fn test_sessions_scoped_per_day_and_cohort() {
        let f = fixture();
        let today = f.state.today();
        let a = f.state.session_for(&Selection::new(today, "1990s", today));
        let b = f.state.session_for(&Selection::new(today, "1990s", today).forced());
        let c = f.state.session_for(&Selection::new(today, "common", today));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        drop((a, b, c));
        let _d = f.state.session_for(&Selection::new(today, "1980s", today));
        assert_eq!(f.state.sessions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_date() {
        let f = fixture();
        assert_eq!(f.state.resolve_date(None).unwrap(), f.state.today());
        assert!(matches!(f.state.resolve_date(Some("2026-1-9")), Err(Error::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_startup_sweeps_and_syncs_version() {
        let f = fixture();
        let old = DailyBundle::empty("2025-01-01", "1990s");
        let today = DailyBundle::resolved(TODAY, "1990s", Default::default(), FingerprintAlgorithm::Wide);
        f.state.bundles.write(&old).await;
        f.state.bundles.write(&today).await;

        let (sweep, invalidated) = f.state.startup(CONTENT_VERSION).await;
        assert!(matches!(sweep, SweepOutcome::Swept { deleted: 1, .. }));
        assert!(invalidated);
        assert!(f.state.bundles.read(TODAY, "1990s").await.is_none());

        let (sweep, invalidated) = f.state.startup(CONTENT_VERSION).await;
        assert_eq!(sweep, SweepOutcome::Skipped);
        assert!(!invalidated);
        assert!(f.kv.len().await > 0);
    }
}
