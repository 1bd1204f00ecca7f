//! cache_sweep tool implementation.
//!
//! Runs the once-per-day retention sweep on demand.

use refill_core::{Error, SweepOutcome};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};

use crate::state::ReaderState;

/// Implementation of the cache_sweep tool.
pub async fn sweep_impl(state: &ReaderState) -> Result<CallToolResult, McpError> {
    let outcome: SweepOutcome = state.sweep.run(state.today()).await;
    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
