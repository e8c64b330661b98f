//! Shared fixtures for tool tests: an in-process transport and an engine on
//! an in-memory database.

use async_trait::async_trait;
use lantern_client::fetch::{Transport, TransportError};
use lantern_client::{Engine, InterceptedRequest};
use lantern_core::{AppConfig, CacheDb, ResponseKind, ResponseSnapshot};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub const HOST: &str = "https://learn.example.com";

const ROUTES: &[(&str, &str)] = &[
    ("/static/js/bundle.js", "console.log('bundle')"),
    ("/manifest.json", "{}"),
    ("/offline.html", "<p>offline</p>"),
    ("/courses/12", "<h1>Course 12</h1>"),
    ("/api/contents/7/", r#"{"id":7}"#),
    ("/api/categories/3/", r#"{"id":3}"#),
    ("/api/review/today/", r#"{"due":4}"#),
];

/// Serves [`ROUTES`] with 200 and everything else with 404.
pub struct StubTransport;

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, TransportError> {
        let path = request.url.path();
        let response = match ROUTES.iter().find(|(route, _)| *route == path) {
            Some((_, body)) => ResponseSnapshot::new(200, ResponseKind::Basic, vec![], *body),
            None => ResponseSnapshot::new(404, ResponseKind::Basic, vec![], "not found"),
        };
        Ok(response)
    }
}

pub fn config() -> AppConfig {
    AppConfig {
        origin: HOST.into(),
        precache_manifest: vec!["/static/js/bundle.js".into(), "/manifest.json".into()],
        ..AppConfig::default()
    }
}

pub async fn engine() -> (Engine, CacheDb) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let engine = Engine::start(&config(), Arc::new(db.clone()), Arc::new(StubTransport)).await.unwrap();
    (engine, db)
}

/// Decode the JSON text content of a tool result.
pub fn output_of<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
