//! Daily bundle cache.
//!
//! Bundles are frozen per-(date, cohort) snapshots of resolved content kept in
//! the device [`KvStore`](crate::store::KvStore). This module provides:
//!
//! - Fingerprinting of content into read-tracking identities
//! - Bundle read/write/get-or-create with cascade deletes of read flags
//! - Read tracking keyed by fingerprint
//! - Targeted, ranged, global and version-driven invalidation
//! - A once-per-day retention sweep

pub mod bundle;
pub mod hash;
pub mod invalidate;
pub mod read;
pub mod retention;

pub use bundle::BundleStore;
pub use hash::{FingerprintAlgorithm, fingerprint};
pub use invalidate::Invalidator;
pub use read::ReadTracker;
pub use retention::{RetentionSweep, SweepOutcome};

/// Last day the retention sweep ran (`YYYY-MM-DD`).
pub const META_LAST_CLEANUP: &str = "meta:lastCleanupYMD";
/// Persisted global content version.
pub const META_CONTENT_VERSION: &str = "meta:contentVersion";
/// Human-readable reason of the most recent invalidation.
pub const META_LAST_INVALIDATION_REASON: &str = "meta:lastInvalidationReason";
