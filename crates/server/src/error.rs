//! Tool-level errors for the lantern server.
//!
//! Engine and storage failures use `lantern_core::Error`; these cover
//! arguments that never reach the engine.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Malformed tool arguments (bad method, role, destination).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A control message that is not a JSON object with a `type` field.
    #[error("INVALID_MESSAGE: {0}")]
    InvalidMessage(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::InvalidMessage(msg) => (-32602, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
