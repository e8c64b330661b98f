//! Transport error types.

use std::sync::Arc;

/// Connection-level failure to obtain any response.
///
/// An HTTP error status from a reachable server is not a `TransportError`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The host's HTTP client gave up waiting.
    #[error("request timeout")]
    Timeout,

    /// Could not connect (DNS failure, connection refused, TLS failure).
    #[error("connect error: {0}")]
    Connect(Arc<reqwest::Error>),

    /// Connection dropped or body could not be read.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The request could not be built (bad method or header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No network at all; used by in-process transports.
    #[error("network unavailable")]
    Offline,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(Arc::new(err))
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(Arc::new(err))
        }
    }
}
