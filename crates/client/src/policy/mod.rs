//! Cache-first freshness policy.
//!
//! Decides, per selection, whether to trust the cached bundle, show it and
//! refresh in the background, or resolve from the source. The steps are split
//! ([`FreshnessPolicy::plan`], [`FreshnessPolicy::fetch`],
//! [`FreshnessPolicy::apply`]) so a session can drop a superseded fetch before
//! it touches the cache. [`FreshnessPolicy::load`] runs them back to back.

mod session;

pub use session::ReaderSession;

use chrono::NaiveDate;
use refill_core::calendar::{days_ago, format_ymd};
use refill_core::content::bundle_key;
use refill_core::{BundleStore, ContentRecord, DailyBundle};
use serde::Serialize;

use crate::resolver::ContentResolver;
use crate::source::{Lookup, ResolvedFrom};

/// Default number of past days that still get a background refresh.
pub const DEFAULT_RECENT_WINDOW_DAYS: u32 = 7;

/// What the reader asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub date: NaiveDate,
    pub cohort: String,
    pub today: NaiveDate,
    /// Skip the cache and overwrite it with the source's answer.
    pub force_server: bool,
}

impl Selection {
    pub fn new(date: NaiveDate, cohort: impl Into<String>, today: NaiveDate) -> Self {
        Self { date, cohort: cohort.into(), today, force_server: false }
    }

    pub fn forced(mut self) -> Self {
        self.force_server = true;
        self
    }

    fn ymd(&self) -> String {
        format_ymd(self.date)
    }

    /// Bundle key of the selected day and cohort.
    pub fn key(&self) -> String {
        bundle_key(&self.ymd(), &self.cohort)
    }
}

/// Where a rendered view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewSource {
    /// Date is after today; nothing was read or written.
    Future,
    /// Local bundle.
    Cache,
    /// Fresh answer from the content source, now cached.
    Server,
    /// Source failed and no cache existed; an empty bundle was persisted.
    Fallback,
}

/// One rendering of the selected day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub date: String,
    pub cohort: String,
    pub bundle: Option<DailyBundle>,
    pub source: ViewSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_from: Option<ResolvedFrom>,
}

impl View {
    fn future(sel: &Selection) -> Self {
        Self { date: sel.ymd(), cohort: sel.cohort.clone(), bundle: None, source: ViewSource::Future, resolved_from: None }
    }

    fn cached(bundle: DailyBundle) -> Self {
        Self {
            date: bundle.date.clone(),
            cohort: bundle.cohort.clone(),
            bundle: Some(bundle),
            source: ViewSource::Cache,
            resolved_from: None,
        }
    }

    fn with(bundle: DailyBundle, source: ViewSource, resolved_from: Option<ResolvedFrom>) -> Self {
        Self { date: bundle.date.clone(), cohort: bundle.cohort.clone(), bundle: Some(bundle), source, resolved_from }
    }

    pub fn content(&self) -> Option<&ContentRecord> {
        self.bundle.as_ref()?.content.as_ref()
    }

    pub fn content_id(&self) -> Option<&str> {
        self.bundle.as_ref()?.content_id.as_deref()
    }

    /// True when there is nothing worth showing, including blank-only records.
    pub fn is_empty(&self) -> bool {
        !self.content().is_some_and(ContentRecord::has_meaningful_content)
    }
}

/// Outcome of the cache-only first step.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Selected date is after today.
    Future,
    /// Cached bundle is final for this selection.
    Trusted(DailyBundle),
    /// Ask the source. With `background`, `cached` is rendered first and a
    /// non-empty cache is never replaced by an empty answer.
    Resolve { cached: Option<DailyBundle>, background: bool },
}

impl Plan {
    /// View to render before any network work, if any.
    pub fn immediate(&self, sel: &Selection) -> Option<View> {
        match self {
            Plan::Future => Some(View::future(sel)),
            Plan::Trusted(bundle) => Some(View::cached(bundle.clone())),
            Plan::Resolve { cached: Some(bundle), background: true } => Some(View::cached(bundle.clone())),
            Plan::Resolve { .. } => None,
        }
    }
}

/// Cache-first freshness policy over a bundle store and a resolver.
#[derive(Clone)]
pub struct FreshnessPolicy {
    bundles: BundleStore,
    resolver: ContentResolver,
    recent_window_days: u32,
}

impl FreshnessPolicy {
    pub fn new(bundles: BundleStore, resolver: ContentResolver, recent_window_days: u32) -> Self {
        Self { bundles, resolver, recent_window_days }
    }

    pub fn bundles(&self) -> &BundleStore {
        &self.bundles
    }

    /// Decide from the cache alone. Future dates never touch the store.
    pub async fn plan(&self, sel: &Selection) -> Plan {
        if sel.date > sel.today {
            return Plan::Future;
        }

        let cached = self.bundles.read(&sel.ymd(), &sel.cohort).await;
        let Some(bundle) = cached else {
            tracing::debug!(date = %sel.date, cohort = %sel.cohort, "bundle cache miss");
            return Plan::Resolve { cached: None, background: false };
        };

        if sel.force_server {
            return Plan::Resolve { cached: Some(bundle), background: false };
        }

        let age = days_ago(sel.date, sel.today);
        let is_recent_past = (0..=i64::from(self.recent_window_days)).contains(&age);
        let refresh = bundle.content.is_none() || sel.date == sel.today || is_recent_past;

        tracing::debug!(date = %sel.date, cohort = %sel.cohort, refresh, "bundle cache hit");
        if refresh {
            Plan::Resolve { cached: Some(bundle), background: true }
        } else {
            Plan::Trusted(bundle)
        }
    }

    /// Ask the resolver. `None` means the answer could not be determined.
    pub async fn fetch(&self, sel: &Selection) -> Option<Lookup> {
        self.resolver.fetch_daily(&sel.ymd(), &sel.cohort).await
    }

    /// Persist the fetch outcome and produce the final view.
    pub async fn apply(
        &self,
        sel: &Selection,
        cached: Option<DailyBundle>,
        background: bool,
        outcome: Option<Lookup>,
    ) -> View {
        let date = sel.ymd();

        let Some(lookup) = outcome else {
            if let Some(bundle) = cached {
                return View::cached(bundle);
            }
            let empty = DailyBundle::empty(&date, &sel.cohort);
            self.bundles.write(&empty).await;
            return View::with(empty, ViewSource::Fallback, None);
        };

        match lookup.content {
            Some(content) => {
                let bundle = DailyBundle::resolved(&date, &sel.cohort, content, self.bundles.algorithm());
                self.bundles.write(&bundle).await;
                View::with(bundle, ViewSource::Server, Some(lookup.resolved_from))
            }
            None => {
                if background
                    && let Some(bundle) = cached
                    && !bundle.is_empty()
                {
                    tracing::info!(%date, cohort = %sel.cohort, "refresh returned no content, keeping cached bundle");
                    return View::cached(bundle);
                }
                let empty = DailyBundle::empty(&date, &sel.cohort);
                self.bundles.write(&empty).await;
                View::with(empty, ViewSource::Server, Some(lookup.resolved_from))
            }
        }
    }

    /// Plan, fetch if needed, and apply.
    pub async fn load(&self, sel: &Selection) -> View {
        match self.plan(sel).await {
            Plan::Future => View::future(sel),
            Plan::Trusted(bundle) => View::cached(bundle),
            Plan::Resolve { cached, background } => {
                let outcome = self.fetch(sel).await;
                self.apply(sel, cached, background, outcome).await
            }
        }
    }
}
