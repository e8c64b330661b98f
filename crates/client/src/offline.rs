//! Synthetic responses returned when neither network nor cache can answer.

use lantern_core::{ResponseKind, ResponseSnapshot};
use serde::Serialize;

/// Body of the synthetic 503 returned for API requests.
#[derive(Debug, Clone, Serialize)]
pub struct OfflineBody<'a> {
    pub error: &'a str,
    pub message: &'a str,
    pub offline: bool,
}

const OFFLINE_PAGE: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>Offline</title></head>
<body><h1>You are offline</h1><p>Check your connection and reload the page.</p></body>
</html>
";

/// 503 with `{error, message, offline: true}`.
pub fn api_unavailable(message: &str) -> ResponseSnapshot {
    let body = OfflineBody { error: "Network unavailable", message, offline: true };
    let value = serde_json::to_value(&body).unwrap_or_else(|_| serde_json::json!({ "offline": true }));
    ResponseSnapshot::json(503, &value)
}

/// 200 minimal HTML page for failed navigations with no cached fallback.
pub fn offline_document() -> ResponseSnapshot {
    ResponseSnapshot::html(200, OFFLINE_PAGE)
}

/// 404 for static assets that are neither cached nor reachable.
pub fn asset_not_found() -> ResponseSnapshot {
    ResponseSnapshot::new(
        404,
        ResponseKind::Synthetic,
        vec![("content-type".into(), "text/plain; charset=utf-8".into())],
        "Not found",
    )
}
