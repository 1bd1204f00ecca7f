//! Core types and shared functionality for the knowledge-refill reader.
//!
//! This crate provides:
//! - Device-local key-value store abstraction (in-memory and SQLite)
//! - Daily bundle cache with fingerprinting, invalidation and retention
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod calendar;
pub mod cohort;
pub mod config;
pub mod content;
pub mod error;
pub mod settings;
pub mod store;

pub use cache::{BundleStore, FingerprintAlgorithm, Invalidator, ReadTracker, RetentionSweep, SweepOutcome};
pub use config::{AppConfig, ResolverKind};
pub use content::{ContentRecord, DailyBundle, LegacyFields, Sections, SourceLink};
pub use error::Error;
pub use settings::{ReaderSettings, ReminderSettings};
pub use store::{KvStore, MemoryStore, SqliteStore, StoreError};

/// Global content version. Bump to force regeneration of today's and future bundles.
pub const CONTENT_VERSION: u32 = 1;
