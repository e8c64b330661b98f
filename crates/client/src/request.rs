//! Outgoing requests as seen by the interceptor.

use bytes::Bytes;
use lantern_core::RequestIdentity;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// What the request is for, as declared by the page that issued it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Destination {
    /// Top-level navigation.
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    /// `fetch()`/XHR and anything else without a declared destination.
    #[default]
    Empty,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Document => "document",
            Destination::Script => "script",
            Destination::Style => "style",
            Destination::Image => "image",
            Destination::Font => "font",
            Destination::Manifest => "manifest",
            Destination::Empty => "",
        }
    }

    /// Sub-resource destinations a page loads in no-cors mode, whose
    /// cross-origin responses are opaque.
    pub fn is_no_cors(&self) -> bool {
        matches!(
            self,
            Destination::Script | Destination::Style | Destination::Image | Destination::Font | Destination::Manifest
        )
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Destination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(Destination::Document),
            "script" => Ok(Destination::Script),
            "style" => Ok(Destination::Style),
            "image" => Ok(Destination::Image),
            "font" => Ok(Destination::Font),
            "manifest" => Ok(Destination::Manifest),
            "" | "empty" => Ok(Destination::Empty),
            other => Err(format!("unknown destination: {other}")),
        }
    }
}

/// An outgoing request handed to the engine.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    /// Upper-cased HTTP method.
    pub method: String,
    pub url: Url,
    pub destination: Destination,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl InterceptedRequest {
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            url,
            destination: Destination::Empty,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// A top-level navigation to `url`.
    pub fn navigate(url: Url) -> Self {
        Self::get(url).with_destination(Destination::Document)
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Cache key for this request given the configured relevant headers.
    pub fn identity(&self, vary_headers: &[String]) -> RequestIdentity {
        RequestIdentity::new(&self.method, self.url.as_str()).with_vary(vary_headers, &self.headers)
    }
}
