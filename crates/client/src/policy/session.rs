//! Reader session: one logical flow of selections with stale-result guarding.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use super::{FreshnessPolicy, Plan, Selection, View};

/// Drives the freshness policy for one reader.
///
/// Every [`select`](ReaderSession::select) takes a new generation. A fetch
/// result is written and published only while its generation is current, so
/// a later selection (including a forced one) always wins over an older
/// in-flight refresh.
pub struct ReaderSession {
    policy: Arc<FreshnessPolicy>,
    generation: AtomicU64,
    view_tx: watch::Sender<Option<View>>,
}

impl ReaderSession {
    pub fn new(policy: Arc<FreshnessPolicy>) -> Self {
        let (view_tx, _) = watch::channel(None);
        Self { policy, generation: AtomicU64::new(0), view_tx }
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    /// Receiver for every view this session renders.
    pub fn subscribe(&self) -> watch::Receiver<Option<View>> {
        self.view_tx.subscribe()
    }

    /// Most recently rendered view.
    pub fn current(&self) -> Option<View> {
        self.view_tx.borrow().clone()
    }

    /// Most recent view, waiting up to `limit` for a first one.
    ///
    /// A caller whose [`select`](ReaderSession::select) was superseded shows
    /// this instead: whatever the newer selection rendered.
    pub async fn latest(&self, limit: Duration) -> Option<View> {
        let mut rx = self.view_tx.subscribe();
        match tokio::time::timeout(limit, rx.wait_for(Option::is_some)).await {
            Ok(Ok(view)) => (*view).clone(),
            _ => None,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn publish(&self, generation: u64, view: View) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.view_tx.send_replace(Some(view));
        true
    }

    /// Load `sel`, rendering the cached view first when the policy allows.
    ///
    /// Returns the final view, or `None` if a newer selection superseded this
    /// one before its fetch completed. A superseded result never reaches the
    /// cache.
    pub async fn select(&self, sel: &Selection) -> Option<View> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let plan = self.policy.plan(sel).await;
        if let Some(view) = plan.immediate(sel) {
            self.publish(generation, view.clone());
            if !matches!(plan, Plan::Resolve { .. }) {
                return Some(view);
            }
        }

        let Plan::Resolve { cached, background } = plan else {
            return None;
        };

        let outcome = self.policy.fetch(sel).await;
        if !self.is_current(generation) {
            tracing::debug!(date = %sel.date, cohort = %sel.cohort, generation, "discarding superseded fetch");
            return None;
        }

        let view = self.policy.apply(sel, cached, background, outcome).await;
        self.publish(generation, view.clone());
        Some(view)
    }
}
