//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::ReaderState;
use crate::tools::{
    CacheInvalidateParams, DailyMarkReadParams, DailyOpenParams, DailyReadMapParams, ReaderSettingsParams,
    invalidate_impl, mark_read_impl, open_impl, read_map_impl, settings_impl, sweep_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for the daily reader.
#[derive(Clone)]
pub struct RefillServer {
    state: Arc<ReaderState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl RefillServer {
    /// Create a new server handler over shared reader state.
    pub fn new(state: Arc<ReaderState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Open a day's content for a cohort.
    ///
    /// Cache-first: a cached bundle is served and refreshed when it is today's,
    /// recent, or empty. Future dates return an empty view without touching the cache.
    #[tool(
        description = "Open the daily content for a date and cohort. Returns the bundle, its content id and read state."
    )]
    async fn daily_open(&self, params: Parameters<DailyOpenParams>) -> Result<CallToolResult, McpError> {
        open_impl(&self.state, params.0).await
    }

    #[tool(description = "Mark the cached content for a date and cohort as read. Disabled for future dates and previews.")]
    async fn daily_mark_read(&self, params: Parameters<DailyMarkReadParams>) -> Result<CallToolResult, McpError> {
        mark_read_impl(&self.state, params.0).await
    }

    #[tool(description = "Read state per day for a date range (max 62 days). No network requests are made.")]
    async fn daily_read_map(&self, params: Parameters<DailyReadMapParams>) -> Result<CallToolResult, McpError> {
        read_map_impl(&self.state, params.0).await
    }

    #[tool(description = "Invalidate cached bundles and their read flags: one day, a date range, or all.")]
    async fn cache_invalidate(&self, params: Parameters<CacheInvalidateParams>) -> Result<CallToolResult, McpError> {
        invalidate_impl(&self.state, params.0).await
    }

    #[tool(description = "Run the retention sweep (at most once per day). Drops bundles older than the retention window.")]
    async fn cache_sweep(&self) -> Result<CallToolResult, McpError> {
        sweep_impl(&self.state).await
    }

    #[tool(description = "Read or update reader settings: birth year and daily reminder.")]
    async fn reader_settings(&self, params: Parameters<ReaderSettingsParams>) -> Result<CallToolResult, McpError> {
        settings_impl(&self.state, params.0).await
    }
}

impl ServerHandler for RefillServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "refill-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
