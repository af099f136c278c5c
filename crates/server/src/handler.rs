//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use crate::state::AppState;
use crate::tools::{
    cache::{CacheGetParams, CacheKeysParams, get_impl, keys_impl},
    fetch::{WorkerFetchParams, fetch_impl},
    network::{NetworkSetOnlineParams, set_online_impl},
    worker::{WorkerUpdateParams, skip_waiting_impl, status_impl, update_impl},
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

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct McpSwServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl McpSwServer {
    /// Create a new server handler around the shared worker state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }

    #[tool(
        description = "Install a new worker generation for a cache version (defaults to the configured version). Precaches the app shell and activates it when allowed."
    )]
    async fn worker_update(&self, params: Parameters<WorkerUpdateParams>) -> Result<CallToolResult, McpError> {
        update_impl(&self.state, params.0).await
    }

    #[tool(description = "Activate the waiting worker generation immediately. A no-op when nothing is waiting.")]
    async fn worker_skip_waiting(&self) -> Result<CallToolResult, McpError> {
        skip_waiting_impl(&self.state).await
    }

    #[tool(description = "Report the installing, waiting and active worker generations and their cache namespaces.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.state).await
    }

    /// Dispatch a fetch event through the worker.
    ///
    /// Reports the routing classification, where the response came from, and
    /// a preview of the body.
    #[tool(
        description = "Dispatch a request through the caching worker as a page would. Returns the response source (network, cache, shell, passthrough), status, headers and a body preview."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }

    #[tool(description = "List cache namespaces, or the request keys stored in one namespace.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(self.state.storage.as_ref(), params.0).await
    }

    #[tool(description = "Read one stored response from a cache namespace by URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.state.storage.as_ref(), self.state.registration.scope(), params.0).await
    }

    #[tool(description = "Switch the simulated network on or off. While offline every network fetch fails.")]
    async fn network_set_online(&self, params: Parameters<NetworkSetOnlineParams>) -> Result<CallToolResult, McpError> {
        set_online_impl(&self.state, params.0).await
    }
}

impl ServerHandler for McpSwServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
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
