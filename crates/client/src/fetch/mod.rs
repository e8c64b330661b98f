//! Network transport for intercepted requests.
//!
//! ### Transport contract
//! - Any HTTP status from a reachable server is a successful send; 4xx/5xx pass
//!   through untouched.
//! - Only connection-level failure (timeout, DNS, refused, reset) is an error.
//!
//! ### FetchClient
//! - reqwest with rustls, gzip/brotli/deflate, limited redirects
//! - Forwards method, headers and body as given
//! - Marks same-origin responses `basic`, cross-origin sub-resources `opaque`,
//!   cross-origin `fetch()`/XHR `cors`

pub mod error;
pub mod url;

use async_trait::async_trait;
use lantern_core::{AppConfig, Error, ResponseKind, ResponseSnapshot};
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use error::TransportError;
pub use url::{UrlError, resolve, same_origin};

use crate::request::{Destination, InterceptedRequest};

/// Something that can put a request on the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, TransportError>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "lantern/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Origin used to tell `basic` from `cors` responses.
    pub origin: Option<::url::Url>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "lantern/0.1".to_string(),
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            origin: None,
        }
    }
}

impl FetchConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = ::url::Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            origin: Some(origin),
            ..Default::default()
        })
    }
}

/// reqwest-backed [`Transport`].
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

}

/// Response type for `request` answered from `final_url`.
///
/// Same-origin responses and navigations are `basic`. Cross-origin responses
/// are `opaque` for no-cors sub-resources (script, style, image, font,
/// manifest) and `cors` for `fetch()`/XHR. Without an origin everything is
/// `basic`.
pub fn response_kind(
    origin: Option<&::url::Url>, request: &InterceptedRequest, final_url: &::url::Url,
) -> ResponseKind {
    match origin {
        Some(origin) if !same_origin(origin, final_url) => match request.destination {
            Destination::Document => ResponseKind::Basic,
            destination if destination.is_no_cors() => ResponseKind::Opaque,
            _ => ResponseKind::Cors,
        },
        _ => ResponseKind::Basic,
    }
}

#[async_trait]
impl Transport for FetchClient {
    async fn send(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, TransportError> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let kind = response_kind(self.config.origin.as_ref(), request, response.url());
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect::<Vec<_>>();
        let final_url = response.url().clone();

        // Buffer fully so a dropped connection mid-body is a transport error,
        // never a truncated snapshot.
        let body = response.bytes().await?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            final_url = %final_url,
            status,
            bytes = body.len(),
            content_type = headers
                .iter()
                .find(|(k, _)| k == header::CONTENT_TYPE.as_str())
                .map(|(_, v)| v.as_str())
                .unwrap_or(""),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(ResponseSnapshot::new(status, kind, headers, body))
    }
}
