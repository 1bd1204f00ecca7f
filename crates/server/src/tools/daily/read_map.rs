//! daily_read_map tool implementation.
//!
//! Read state per day for a calendar range. Never touches the network.

use std::collections::BTreeMap;

use refill_core::Error;
use refill_core::calendar::{date_range, format_ymd, parse_ymd};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::ReaderState;

/// Longest range accepted in one call.
const MAX_RANGE_DAYS: i64 = 62;

/// Parameters for the daily_read_map tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DailyReadMapParams {
    /// First day, YYYY-MM-DD.
    pub start: String,

    /// Last day (inclusive), YYYY-MM-DD.
    pub end: String,

    /// Cohort (default: the reader's own).
    #[serde(default)]
    pub cohort: Option<String>,
}

/// Output from the daily_read_map tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReadMapOutput {
    pub cohort: String,
    /// Read display is off while previewing another cohort.
    pub preview: bool,
    pub days: BTreeMap<String, bool>,
}

/// Implementation of the daily_read_map tool.
pub async fn read_map_impl(state: &ReaderState, params: DailyReadMapParams) -> Result<CallToolResult, McpError> {
    let start = parse_ymd(params.start.trim())?;
    let end = parse_ymd(params.end.trim())?;
    if start > end {
        return Err(Error::InvalidInput("start must not be after end".into()).into());
    }

    if (end - start).num_days() >= MAX_RANGE_DAYS {
        return Err(Error::InvalidInput(format!("range exceeds {MAX_RANGE_DAYS} days")).into());
    }
    let dates = date_range(start, end);

    let cohort = state.resolve_cohort(params.cohort.as_deref()).await?;
    let preview = state.is_preview(&cohort).await;

    let days = if preview {
        dates
            .iter()
            .map(|d| (format_ymd(*d), false))
            .collect()
    } else {
        state.reads.read_map(&dates, &cohort, state.today()).await
    };

    let output = DailyReadMapOutput { cohort, preview, days };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{fixture, output_json};
    use crate::tools::daily::mark_read::{DailyMarkReadParams, mark_read_impl};
    use crate::tools::daily::open::{DailyOpenParams, open_impl};

    fn params(start: &str, end: &str) -> DailyReadMapParams {
        DailyReadMapParams { start: start.into(), end: end.into(), cohort: None }
    }

    #[tokio::test]
    async fn test_read_map_marks_read_days() {
        let f = fixture();
        f.state.settings.set_birth_year(1994).await.unwrap();
        open_impl(&f.state, DailyOpenParams::default()).await.unwrap();
        mark_read_impl(&f.state, DailyMarkReadParams::default()).await.unwrap();

        let out = output_json(&read_map_impl(&f.state, params("2026-01-17", "2026-01-21")).await.unwrap());
        let output: DailyReadMapOutput = serde_json::from_value(out).unwrap();
        assert_eq!(output.days.len(), 5);
        assert!(output.days["2026-01-19"]);
        assert!(!output.days["2026-01-18"]);
        assert!(!output.days["2026-01-20"]);

        assert!(f.state.bundles.read("2026-01-17", "1990s").await.is_some());
        assert!(f.state.bundles.read("2026-01-20", "1990s").await.is_none());
    }

    #[tokio::test]
    async fn test_read_map_preview_is_all_unread() {
        let f = fixture();
        f.state.settings.set_birth_year(1994).await.unwrap();
        let p = DailyReadMapParams { cohort: Some("1980s".into()), ..params("2026-01-18", "2026-01-19") };
        let output: DailyReadMapOutput =
            serde_json::from_value(output_json(&read_map_impl(&f.state, p).await.unwrap())).unwrap();
        assert!(output.preview);
        assert!(output.days.values().all(|read| !read));
        assert!(f.state.bundles.bundle_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_read_map_rejects_bad_ranges() {
        let f = fixture();
        assert!(read_map_impl(&f.state, params("2026-01-19", "2026-01-18")).await.is_err());
        assert!(read_map_impl(&f.state, params("2026-01-01", "2026-06-01")).await.is_err());
        assert!(read_map_impl(&f.state, params("2026-1-1", "2026-01-02")).await.is_err());
    }
}
