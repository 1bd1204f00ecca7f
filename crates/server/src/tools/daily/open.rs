//! daily_open tool implementation.
//!
//! Opens one day for one cohort through the freshness policy and reports the
//! bundle together with its read state. Concurrent opens of the same day and
//! cohort share a session; an open superseded there reports the view the newer
//! one rendered.

use refill_client::{ResolvedFrom, Selection, ViewSource};
use refill_core::calendar::format_ymd;
use refill_core::{ContentRecord, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::ReaderState;

/// Parameters for the daily_open tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DailyOpenParams {
    /// Date as YYYY-MM-DD (default: today).
    #[serde(default)]
    pub date: Option<String>,

    /// Cohort to view, e.g. "1990s" or "common" (default: the reader's own).
    #[serde(default)]
    pub cohort: Option<String>,

    /// Ignore the local bundle and overwrite it with the server's answer.
    #[serde(default)]
    pub force_server: bool,
}

/// Output from the daily_open tool.
#[derive(Debug, Clone, Serialize)]
pub struct DailyOpenOutput {
    pub date: String,
    pub cohort: String,
    /// Viewing another cohort than the reader's own; read tracking is off.
    pub preview: bool,
    pub source: ViewSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_from: Option<ResolvedFrom>,
    pub content_id: Option<String>,
    pub content: Option<ContentRecord>,
    /// No meaningful text to show.
    pub empty: bool,
    pub read_enabled: bool,
    pub read: bool,
}

/// Implementation of the daily_open tool.
pub async fn open_impl(state: &ReaderState, params: DailyOpenParams) -> Result<CallToolResult, McpError> {
    let date = state.resolve_date(params.date.as_deref())?;
    let cohort = state.resolve_cohort(params.cohort.as_deref()).await?;
    let today = state.today();
    let preview = state.is_preview(&cohort).await;

    let mut sel = Selection::new(date, cohort.clone(), today);
    if params.force_server {
        sel = sel.forced();
    }

    let session = state.session_for(&sel);
    let view = match session.select(&sel).await {
        Some(view) => view,
        None => session
            .latest(state.settle_timeout)
            .await
            .ok_or_else(|| Error::NotFound(format!("{}:{cohort}", format_ymd(date))))?,
    };

    let content_id = view.content_id().map(str::to_string);
    let read_enabled = !preview && date <= today && content_id.is_some();
    let read = match content_id.as_deref() {
        Some(id) if read_enabled => state.reads.is_read(id).await,
        _ => false,
    };

    let output = DailyOpenOutput {
        empty: view.is_empty(),
        content: view.content().cloned(),
        date: view.date,
        cohort: view.cohort,
        preview,
        source: view.source,
        resolved_from: view.resolved_from,
        content_id,
        read_enabled,
        read,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
