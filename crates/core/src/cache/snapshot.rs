//! Immutable response captures.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a response came from, as seen by the page that issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin network response.
    Basic,
    /// Cross-origin network response.
    Cors,
    /// Cross-origin response whose status and body are hidden.
    Opaque,
    /// Built locally by the engine.
    Synthetic,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseKind::Basic),
            "cors" => Ok(ResponseKind::Cors),
            "opaque" => Ok(ResponseKind::Opaque),
            "synthetic" => Ok(ResponseKind::Synthetic),
            other => Err(format!("unknown response kind: {other}")),
        }
    }
}

/// Status, headers and body of a response at the moment it was captured.
///
/// The body is a [`Bytes`] so handing one copy to the cache and another to the
/// caller is a reference-count bump, not a second read of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ResponseSnapshot {
    pub fn new(status: u16, kind: ResponseKind, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, kind, headers, body: body.into() }
    }

    /// Synthetic JSON response.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(
            status,
            ResponseKind::Synthetic,
            vec![("content-type".into(), "application/json".into())],
            value.to_string(),
        )
    }

    /// Synthetic HTML response.
    pub fn html(status: u16, body: &str) -> Self {
        Self::new(
            status,
            ResponseKind::Synthetic,
            vec![("content-type".into(), "text/html; charset=utf-8".into())],
            body.to_string(),
        )
    }

    /// Case-insensitive header lookup (first match).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether a static asset response may be stored: status 200 from the same
    /// origin (or opaque).
    pub fn is_cacheable_asset(&self) -> bool {
        self.status == 200 && matches!(self.kind, ResponseKind::Basic | ResponseKind::Opaque)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = ResponseSnapshot::new(200, ResponseKind::Basic, vec![("Content-Type".into(), "text/css".into())], "");
        assert_eq!(resp.content_type(), Some("text/css"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("text/css"));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn test_cacheable_asset_requires_200_and_basic() {
        assert!(ResponseSnapshot::new(200, ResponseKind::Basic, vec![], "x").is_cacheable_asset());
        assert!(!ResponseSnapshot::new(200, ResponseKind::Cors, vec![], "x").is_cacheable_asset());
        assert!(!ResponseSnapshot::new(206, ResponseKind::Basic, vec![], "x").is_cacheable_asset());
        assert!(!ResponseSnapshot::new(404, ResponseKind::Basic, vec![], "x").is_cacheable_asset());
    }

    #[test]
    fn test_json_constructor() {
        let resp = ResponseSnapshot::json(503, &serde_json::json!({ "offline": true }));
        assert_eq!(resp.status, 503);
        assert_eq!(resp.kind, ResponseKind::Synthetic);
        assert_eq!(resp.content_type(), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["offline"], true);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [ResponseKind::Basic, ResponseKind::Cors, ResponseKind::Opaque, ResponseKind::Synthetic] {
            assert_eq!(kind.as_str().parse::<ResponseKind>().unwrap(), kind);
        }
        assert!("default".parse::<ResponseKind>().is_err());
    }
}
