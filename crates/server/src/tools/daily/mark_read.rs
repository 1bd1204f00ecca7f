//! daily_mark_read tool implementation.

use refill_core::Error;
use refill_core::calendar::format_ymd;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::ReaderState;

/// Parameters for the daily_mark_read tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DailyMarkReadParams {
    /// Date as YYYY-MM-DD (default: today).
    #[serde(default)]
    pub date: Option<String>,

    /// Cohort of the bundle (default: the reader's own).
    #[serde(default)]
    pub cohort: Option<String>,
}

/// Output from the daily_mark_read tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMarkReadOutput {
    pub content_id: String,
    pub read: bool,
}

/// Implementation of the daily_mark_read tool.
///
/// Only the cached bundle is consulted; open the day first.
pub async fn mark_read_impl(state: &ReaderState, params: DailyMarkReadParams) -> Result<CallToolResult, McpError> {
    let date = state.resolve_date(params.date.as_deref())?;
    let cohort = state.resolve_cohort(params.cohort.as_deref()).await?;

    if date > state.today() {
        return Err(Error::ReadDisabled(format!("{} is in the future", format_ymd(date))).into());
    }
    if state.is_preview(&cohort).await {
        return Err(Error::ReadDisabled(format!("previewing cohort {cohort}")).into());
    }

    let ymd = format_ymd(date);
    let content_id = state
        .bundles
        .read(&ymd, &cohort)
        .await
        .and_then(|bundle| bundle.content_id)
        .ok_or_else(|| Error::NotFound(format!("no content for {ymd}:{cohort}")))?;

    state.reads.mark_read(&content_id).await.map_err(Error::from)?;

    let output = DailyMarkReadOutput { content_id, read: true };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
