//! MCP server handler implementation.
//!
//! Routes tool calls to the running engine and the cache database behind it.
use crate::tools::cache::{CacheGetParams, get_impl, stores_impl};
use crate::tools::{FetchParams, PostMessageParams, fetch_impl, post_message_impl};

use lantern_client::Engine;
use lantern_core::CacheDb;
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
use std::sync::Arc;

/// The main MCP server handler for lantern.
#[derive(Clone)]
pub struct LanternServer {
    engine: Arc<Engine>,
    cache: CacheDb,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl LanternServer {
    pub fn new(engine: Arc<Engine>, cache: CacheDb) -> Self {
        Self { engine, cache, tool_router: Self::tool_router() }
    }

    /// Issue a request through the interception engine.
    #[tool(
        description = "Send a request through the offline cache engine. Returns status, headers, body, the request category and whether the response came from network, cache or a synthetic fallback."
    )]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.engine, params.0).await
    }

    #[tool(
        description = "Post a control message to the engine, e.g. {\"type\": \"INVALIDATE_CONTENT_CACHE\"} after mutating content. Fire-and-forget."
    )]
    async fn post_message(&self, params: Parameters<PostMessageParams>) -> Result<CallToolResult, McpError> {
        post_message_impl(&self.engine, params.0).await
    }

    #[tool(description = "List cache stores with their entry counts and the engine lifecycle state.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.engine, &self.cache).await
    }

    #[tool(description = "Read a cached response from the current static or api store without touching the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.engine, params.0).await
    }
}

impl ServerHandler for LanternServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "lantern".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::engine;

    #[tokio::test]
    async fn test_router_lists_all_tools() {
        let (engine, db) = engine().await;
        let server = LanternServer::new(Arc::new(engine), db);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["cache_get", "cache_stores", "fetch", "post_message"]);
        assert_eq!(server.get_info().server_info.name, "lantern");
    }
}
