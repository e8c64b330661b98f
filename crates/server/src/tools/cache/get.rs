//! cache_get tool implementation.
//!
//! Reads one entry from a current store without going to the network.

use lantern_client::{Engine, InterceptedRequest};
use lantern_core::{Error, StoreRole};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::tools::fetch::Header;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Which current store to read: "static" or "api".
    pub role: String,

    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method of the cached request (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers; only the configured vary headers affect the lookup.
    #[serde(default)]
    pub headers: Vec<Header>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub url: String,
    pub status: u16,
    pub kind: String,
    pub headers: Vec<Header>,
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(engine: &Engine, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let role: StoreRole = params.role.parse().map_err(|e: Error| ToolError::InvalidInput(e.to_string()))?;
    let url = engine.resolve(&params.url)?;

    let mut request = InterceptedRequest::new(&params.method, url);
    for header in &params.headers {
        request = request.with_header(&header.name, &header.value);
    }

    let store = engine.store(role).name().to_string();
    let snapshot = engine
        .lookup(role, &request)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} {} in {store}", request.method, request.url)))?;

    let output = CacheGetOutput {
        store,
        url: request.url.to_string(),
        status: snapshot.status,
        kind: snapshot.kind.to_string(),
        headers: snapshot
            .headers
            .iter()
            .map(|(name, value)| Header { name: name.clone(), value: value.clone() })
            .collect(),
        body: snapshot.body_text(),
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize snapshot: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
