//! fetch tool implementation.
//!
//! Hands one request to the engine as if the application had issued it and
//! reports the response together with its category and source.

use lantern_client::{Destination, Engine, InterceptedRequest};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// A single request or response header.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination: "document", "script", "style", "image", "font",
    /// "manifest" or empty. "document" marks a navigation.
    #[serde(default)]
    pub destination: Option<String>,

    #[serde(default)]
    pub headers: Vec<Header>,

    /// UTF-8 request body.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    pub url: String,
    pub status: u16,
    /// "basic", "cors", "opaque" or "synthetic".
    pub kind: String,
    pub headers: Vec<Header>,
    /// Body decoded as UTF-8, lossy.
    pub body: String,
    /// "network", "cache" or "synthetic".
    pub source: String,
    /// "document", "static-asset", "api-credentialed" or "api-uncredentialed".
    pub category: String,
}

fn build_request(engine: &Engine, params: FetchParams) -> Result<InterceptedRequest, McpError> {
    let method = params.method.trim();
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ToolError::InvalidInput(format!("invalid method: {:?}", params.method)).into());
    }

    let url = engine.resolve(&params.url)?;
    let destination = match params.destination.as_deref() {
        Some(raw) => raw.parse::<Destination>().map_err(ToolError::InvalidInput)?,
        None => Destination::Empty,
    };

    let mut request = InterceptedRequest::new(method, url).with_destination(destination);
    for header in &params.headers {
        request = request.with_header(&header.name, &header.value);
    }
    if let Some(body) = params.body {
        request = request.with_body(body);
    }
    Ok(request)
}

/// Implementation of the fetch tool.
pub async fn fetch_impl(engine: &Engine, params: FetchParams) -> Result<CallToolResult, McpError> {
    let request = build_request(engine, params)?;
    let url = request.url.to_string();
    let served = engine.fetch(request).await;

    let output = FetchOutput {
        url,
        status: served.response.status,
        kind: served.response.kind.to_string(),
        headers: served
            .response
            .headers
            .iter()
            .map(|(name, value)| Header { name: name.clone(), value: value.clone() })
            .collect(),
        body: served.response.body_text(),
        source: served.source.as_str().to_string(),
        category: served.category.as_str().to_string(),
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| lantern_core::Error::Serialization(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
