//! cache_invalidate tool implementation.
//!
//! Cascade-deletes bundles (and their read flags) for one day, a date range,
//! or everything.

use refill_core::Error;
use refill_core::calendar::{format_ymd, parse_ymd};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::ReaderState;

/// Which bundles to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvalidateScope {
    /// One (date, cohort) bundle.
    One,
    /// Every bundle with start <= date <= end, optionally one cohort only.
    Range,
    /// Every bundle. Requires a reason.
    All,
}

/// Parameters for the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateParams {
    pub scope: InvalidateScope,

    /// Day for scope "one", YYYY-MM-DD.
    #[serde(default)]
    pub date: Option<String>,

    /// Range start for scope "range", YYYY-MM-DD.
    #[serde(default)]
    pub start: Option<String>,

    /// Range end (inclusive) for scope "range", YYYY-MM-DD.
    #[serde(default)]
    pub end: Option<String>,

    /// Cohort; required for "one", optional filter for "range".
    #[serde(default)]
    pub cohort: Option<String>,

    /// Free-text reason recorded for diagnostics.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Output from the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInvalidateOutput {
    pub scope: InvalidateScope,
    /// Bundles removed.
    pub deleted: usize,
    /// Reason string as recorded.
    pub recorded_reason: Option<String>,
}

fn required_date(value: Option<&str>, field: &str) -> Result<String, Error> {
    let raw = value.ok_or_else(|| Error::InvalidInput(format!("{field} is required")))?;
    Ok(format_ymd(parse_ymd(raw.trim())?))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Implementation of the cache_invalidate tool.
pub async fn invalidate_impl(state: &ReaderState, params: CacheInvalidateParams) -> Result<CallToolResult, McpError> {
    let reason = non_blank(params.reason.as_deref());
    let invalidator = &state.invalidator;

    let deleted = match params.scope {
        InvalidateScope::One => {
            let date = required_date(params.date.as_deref(), "date")?;
            let cohort = params
                .cohort
                .as_deref()
                .ok_or_else(|| Error::InvalidInput("cohort is required for scope one".into()))?;
            let cohort = state.resolve_cohort(Some(cohort)).await?;
            usize::from(invalidator.invalidate_one(&date, &cohort, reason).await)
        }
        InvalidateScope::Range => {
            let start = required_date(params.start.as_deref(), "start")?;
            let end = required_date(params.end.as_deref(), "end")?;
            if start > end {
                return Err(Error::InvalidInput("start must not be after end".into()).into());
            }
            let cohort = match params.cohort.as_deref() {
                Some(c) => Some(state.resolve_cohort(Some(c)).await?),
                None => None,
            };
            invalidator
                .invalidate_range(&start, &end, cohort.as_deref(), reason)
                .await
        }
        InvalidateScope::All => {
            let reason = reason.ok_or_else(|| Error::InvalidInput("reason is required for scope all".into()))?;
            invalidator.invalidate_all(reason).await
        }
    };

    let output = CacheInvalidateOutput { scope: params.scope, deleted, recorded_reason: invalidator.last_reason().await };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
