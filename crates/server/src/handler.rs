//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{
    CacheBustParams, CacheExportParams, CacheLookupParams, bust_impl, export_impl, lookup_impl,
};
use crate::tools::http_fetch::{HttpFetchParams, fetch_impl};

use replay_client::{CachingInterceptor, ReqwestHandler};
use replay_core::AppConfig;
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

/// The main MCP server handler for replay.
#[derive(Clone)]
pub struct ReplayServer {
    tool_router: ToolRouter<Self>,
    interceptor: Arc<CachingInterceptor<ReqwestHandler>>,
    config: Arc<AppConfig>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ReplayServer {
    /// Create a new server handler around an interceptor and its store.
    pub fn new(interceptor: CachingInterceptor<ReqwestHandler>, config: AppConfig) -> Self {
        Self { tool_router: Self::tool_router(), interceptor: Arc::new(interceptor), config: Arc::new(config) }
    }

    /// Send an HTTP request through the response cache.
    #[tool(
        description = "Send an HTTP request. A cached response for the same method, URL and query is returned as is."
    )]
    async fn http_fetch(&self, params: Parameters<HttpFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&*self.interceptor, params.0).await
    }

    /// Look up a stored response without forwarding.
    #[tool(description = "Look up the cached entry for a method, URL and query. Fails with CACHE_MISS when absent.")]
    async fn cache_lookup(&self, params: Parameters<CacheLookupParams>) -> Result<CallToolResult, McpError> {
        lookup_impl(self.interceptor.store(), params.0).await
    }

    /// Invalidate one entry or the whole cache.
    #[tool(description = "Remove the first cached entry for a method, URL and query. With neither, clear the cache.")]
    async fn cache_bust(&self, params: Parameters<CacheBustParams>) -> Result<CallToolResult, McpError> {
        bust_impl(self.interceptor.store(), params.0).await
    }

    /// Export the cache as a snapshot.
    #[tool(description = "Serialize every cached entry in order, writing to `path` or the configured export path.")]
    async fn cache_export(&self, params: Parameters<CacheExportParams>) -> Result<CallToolResult, McpError> {
        export_impl(self.interceptor.store(), &self.config, params.0).await
    }
}

impl ServerHandler for ReplayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "replay".into(),
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
