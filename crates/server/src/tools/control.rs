//! post_message tool implementation.
//!
//! Delivers a control message to the engine. Delivery is fire-and-forget:
//! the tool returns once the message is queued, not when it has been applied.

use lantern_client::{ControlMessage, Engine};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Input parameters for the post_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageParams {
    /// Control message object, e.g. `{"type": "INVALIDATE_CONTENT_CACHE"}`.
    pub message: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageOutput {
    /// Message type as received.
    pub r#type: String,
    /// False when the type is not one the engine acts on.
    pub recognized: bool,
}

/// Implementation of the post_message tool.
pub async fn post_message_impl(engine: &Engine, params: PostMessageParams) -> Result<CallToolResult, McpError> {
    let message_type = params
        .message
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidMessage("message must be an object with a string `type`".into()))?
        .to_string();

    let message: ControlMessage =
        serde_json::from_value(params.message).map_err(|e| ToolError::InvalidMessage(e.to_string()))?;
    let recognized = message != ControlMessage::Unknown;

    engine.post_message(message);
    tracing::debug!(%message_type, recognized, "control message posted");

    let output = PostMessageOutput { r#type: message_type, recognized };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| lantern_core::Error::Serialization(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
