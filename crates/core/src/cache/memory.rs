//! In-memory [`CacheStorage`] for tests and throwaway hosts.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::identity::RequestIdentity;
use super::snapshot::ResponseSnapshot;
use super::storage::CacheStorage;
use crate::Error;

type Entries = HashMap<String, (RequestIdentity, ResponseSnapshot)>;

/// Map-backed storage. Clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    stores: Arc<RwLock<BTreeMap<String, Entries>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, store: &str) -> Result<(), Error> {
        self.stores.write().await.entry(store.to_string()).or_default();
        Ok(())
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete_store(&self, store: &str) -> Result<bool, Error> {
        Ok(self.stores.write().await.remove(store).is_some())
    }

    async fn put(&self, store: &str, identity: &RequestIdentity, response: &ResponseSnapshot) -> Result<(), Error> {
        self.stores
            .write()
            .await
            .entry(store.to_string())
            .or_default()
            .insert(identity.cache_key(), (identity.clone(), response.clone()));
        Ok(())
    }

    async fn lookup(&self, store: &str, identity: &RequestIdentity) -> Result<Option<ResponseSnapshot>, Error> {
        let stores = self.stores.read().await;
        Ok(stores
            .get(store)
            .and_then(|entries| entries.get(&identity.cache_key()))
            .map(|(_, response)| response.clone()))
    }

    async fn keys(&self, store: &str) -> Result<Vec<RequestIdentity>, Error> {
        let stores = self.stores.read().await;
        let mut keys: Vec<RequestIdentity> = stores
            .get(store)
            .map(|entries| entries.values().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default();
        keys.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(keys)
    }

    async fn delete(&self, store: &str, identity: &RequestIdentity) -> Result<bool, Error> {
        let mut stores = self.stores.write().await;
        Ok(stores
            .get_mut(store)
            .is_some_and(|entries| entries.remove(&identity.cache_key()).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::snapshot::ResponseKind;

    #[tokio::test]
    async fn test_put_creates_store() {
        let storage = MemoryStorage::new();
        let id = RequestIdentity::get("https://example.com/logo192.png");
        storage
            .put("static:v1", &id, &ResponseSnapshot::new(200, ResponseKind::Basic, vec![], "png"))
            .await
            .unwrap();

        assert_eq!(storage.store_names().await.unwrap(), vec!["static:v1"]);
        assert_eq!(storage.lookup("static:v1", &id).await.unwrap().unwrap().body_text(), "png");
    }

    #[tokio::test]
    async fn test_delete_missing_store_and_entry() {
        let storage = MemoryStorage::new();
        let id = RequestIdentity::get("https://example.com/x");
        assert!(!storage.delete_store("api:v1").await.unwrap());
        assert!(!storage.delete("api:v1", &id).await.unwrap());
        assert!(storage.keys("api:v1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.open("api:v2").await.unwrap();
        assert_eq!(other.store_names().await.unwrap(), vec!["api:v2"]);
    }
}
