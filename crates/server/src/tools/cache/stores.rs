//! cache_stores tool implementation.
//!
//! Lists every store in the cache database with its entry count.

use lantern_client::Engine;
use lantern_core::{CacheDb, Error, StoreRole};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    /// Whether this is one of the engine's two current stores.
    pub current: bool,
}

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Lifecycle state of the engine.
    pub state: String,
    pub stores: Vec<StoreSummary>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(engine: &Engine, cache: &CacheDb) -> Result<CallToolResult, McpError> {
    let current = [engine.store(StoreRole::Static).name(), engine.store(StoreRole::Api).name()];
    let stores = cache
        .entry_counts()
        .await?
        .into_iter()
        .map(|(name, entries)| StoreSummary { current: current.contains(&name.as_str()), name, entries })
        .collect();

    let output = CacheStoresOutput { state: engine.state().to_string(), stores };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{engine, output_of};
    use lantern_core::{CacheStorage, RequestIdentity, ResponseSnapshot};

    #[tokio::test]
    async fn test_stores_after_start() {
        let (engine, db) = engine().await;

        let output: CacheStoresOutput = output_of(&stores_impl(&engine, &db).await.unwrap());
        assert_eq!(output.state, "active");

        let names: Vec<&str> = output.stores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["api:v1", "static:v1"]);
        assert!(output.stores.iter().all(|s| s.current));

        let static_store = output.stores.iter().find(|s| s.name == "static:v1").unwrap();
        assert_eq!(static_store.entries, 3);
    }

    #[tokio::test]
    async fn test_stores_flags_foreign_store() {
        let (engine, db) = engine().await;
        db.put("scratch", &RequestIdentity::get("https://learn.example.com/x"), &ResponseSnapshot::html(200, "x"))
            .await
            .unwrap();

        let output: CacheStoresOutput = output_of(&stores_impl(&engine, &db).await.unwrap());
        let scratch = output.stores.iter().find(|s| s.name == "scratch").unwrap();
        assert!(!scratch.current);
        assert_eq!(scratch.entries, 1);
    }
}
