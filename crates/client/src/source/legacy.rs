//! Legacy JSON content file.
//!
//! The file is an array of rows:
//!
//! ```json
//! [{ "date": "2026-01-19" | "evergreen", "cohort": "1990s" | "all",
//!    "title": "...", "body": "...", "keyChange": "...", "previousContent": "...",
//!    "currentContent": "...", "status": "published" | "draft" }]
//! ```
//!
//! Rows without a `status` count as published. The file is re-read on every
//! lookup so edits show up without a restart.
//!
//! Picking order is date+cohort, date+all, evergreen+cohort, evergreen+all.
//! The date+all step belongs to the resolver's common fallback, so a cohort
//! lookup only answers from its evergreen row when no dated `all` row exists.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use refill_core::ContentRecord;
use refill_core::cohort::is_common;
use serde_json::Value;

use super::response::{ResolvedFrom, normalize_record};
use super::{ContentSource, Lookup, ResolveError};

/// Date value of rows that apply to any day.
pub const EVERGREEN_DATE: &str = "evergreen";

/// Cohort value the legacy file uses for the common cohort.
pub const ALL_COHORT: &str = "all";

/// Content source over a legacy JSON file.
#[derive(Debug, Clone)]
pub struct LegacySource {
    path: PathBuf,
}

impl LegacySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn rows(&self) -> Result<Vec<Value>, ResolveError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ResolveError::Legacy(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&raw).map_err(|e| ResolveError::Parse(e.to_string()))
    }
}

fn is_published(row: &Value) -> bool {
    row.get("status").and_then(Value::as_str).unwrap_or("published") == "published"
}

fn find<'a>(rows: &'a [Value], date: &str, cohort: &str) -> Option<&'a Value> {
    rows.iter().find(|row| {
        row.get("date").and_then(Value::as_str) == Some(date)
            && row.get("cohort").and_then(Value::as_str) == Some(cohort)
            && is_published(row)
    })
}

fn pick(rows: &[Value], date: &str, cohort: &str) -> Option<ContentRecord> {
    find(rows, date, cohort).and_then(normalize_record)
}

#[async_trait]
impl ContentSource for LegacySource {
    /// Exact dated row first. A cohort with no dated row of its own or for
    /// `all` falls back to its evergreen row; the common cohort (stored as
    /// `all`) falls back to the evergreen `all` row.
    async fn lookup(&self, date: &str, cohort: &str) -> Result<Lookup, ResolveError> {
        let rows = self.rows().await?;
        let file_cohort = if is_common(cohort) { ALL_COHORT } else { cohort };

        if let Some(content) = pick(&rows, date, file_cohort) {
            return Ok(Lookup::found(content, ResolvedFrom::Admin));
        }

        if file_cohort != ALL_COHORT && pick(&rows, date, ALL_COHORT).is_some() {
            return Ok(Lookup::none());
        }

        if let Some(content) = pick(&rows, EVERGREEN_DATE, file_cohort) {
            tracing::debug!(date, cohort = file_cohort, "serving evergreen legacy row");
            return Ok(Lookup::found(content, ResolvedFrom::Evergreen));
        }

        Ok(Lookup::none())
    }

    fn name(&self) -> &'static str {
        "legacy"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ROWS: &str = r#"[
        { "id": "evergreen__all", "date": "evergreen", "cohort": "all", "title": "Evergreen", "body": "always", "status": "published" },
        { "id": "2026-01-19__1990s", "date": "2026-01-19", "cohort": "1990s", "title": "Nineties",
          "body": "b", "keyChange": "k", "previousContent": "p", "currentContent": "c", "category": "prog", "priority": "medium" },
        { "id": "2026-01-19__all", "date": "2026-01-19", "cohort": "all", "title": "Everyone", "body": "all body", "status": "published" },
        { "id": "2026-01-20__1990s", "date": "2026-01-20", "cohort": "1990s", "title": "Draft", "body": "x", "status": "draft" }
    ]"#;

    fn fixture() -> (tempfile::NamedTempFile, LegacySource) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ROWS.as_bytes()).unwrap();
        let source = LegacySource::new(file.path());
        (file, source)
    }

    #[tokio::test]
    async fn test_exact_row_without_status_is_published() {
        let (_file, source) = fixture();
        let lookup = source.lookup("2026-01-19", "1990s").await.unwrap();
        assert_eq!(lookup.resolved_from, ResolvedFrom::Admin);
        let content = lookup.content.unwrap();
        assert_eq!(content.title.as_deref(), Some("Nineties"));
        assert_eq!(content.sections.past, "p");
        assert_eq!(content.sections.change, "k");
        assert_eq!(content.sections.detail, "c");
        assert_eq!(content.category.as_deref(), Some("prog"));
    }

    #[tokio::test]
    async fn test_common_maps_to_all() {
        let (_file, source) = fixture();
        let lookup = source.lookup("2026-01-19", "common").await.unwrap();
        assert_eq!(lookup.content.unwrap().title.as_deref(), Some("Everyone"));
    }

    #[tokio::test]
    async fn test_common_falls_back_to_evergreen() {
        let (_file, source) = fixture();
        let lookup = source.lookup("2026-03-01", "common").await.unwrap();
        assert_eq!(lookup.resolved_from, ResolvedFrom::Evergreen);
        assert_eq!(lookup.content.unwrap().sections.detail, "always");
    }

    #[tokio::test]
    async fn test_cohort_miss_and_drafts_are_empty() {
        let (_file, source) = fixture();
        assert_eq!(source.lookup("2026-03-01", "1990s").await.unwrap(), Lookup::none());
        assert_eq!(source.lookup("2026-01-20", "1990s").await.unwrap(), Lookup::none());
    }

    #[tokio::test]
    async fn test_cohort_evergreen_row_after_dated_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                { "date": "evergreen", "cohort": "all", "title": "Evergreen all", "body": "a" },
                { "date": "evergreen", "cohort": "1990s", "title": "Evergreen nineties", "body": "n" },
                { "date": "2026-01-19", "cohort": "all", "title": "Everyone", "body": "e" },
                { "date": "2026-01-20", "cohort": "all", "title": "Unpublished", "body": "u", "status": "draft" }
            ]"#,
        )
        .unwrap();
        let source = LegacySource::new(file.path());

        // A dated `all` row is left to the common fallback.
        assert_eq!(source.lookup("2026-01-19", "1990s").await.unwrap(), Lookup::none());

        let lookup = source.lookup("2026-03-01", "1990s").await.unwrap();
        assert_eq!(lookup.resolved_from, ResolvedFrom::Evergreen);
        assert_eq!(lookup.content.unwrap().title.as_deref(), Some("Evergreen nineties"));

        let lookup = source.lookup("2026-01-20", "1990s").await.unwrap();
        assert_eq!(lookup.content.unwrap().title.as_deref(), Some("Evergreen nineties"));

        let lookup = source.lookup("2026-03-01", "1980s").await.unwrap();
        assert_eq!(lookup, Lookup::none());

        let lookup = source.lookup("2026-03-01", "common").await.unwrap();
        assert_eq!(lookup.content.unwrap().title.as_deref(), Some("Evergreen all"));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let source = LegacySource::new("/nonexistent/contents.json");
        assert!(matches!(source.lookup("2026-01-19", "1990s").await, Err(ResolveError::Legacy(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let source = LegacySource::new(file.path());
        assert!(matches!(source.lookup("2026-01-19", "1990s").await, Err(ResolveError::Parse(_))));
    }
}
