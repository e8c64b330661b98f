//! Install and activate.
//!
//! `installing -> installed -> activating -> active`. Install pre-warms the
//! static store from the manifest; activation deletes every store that is not
//! one of the two current versioned names, then takes control immediately.

use lantern_core::{CacheStorage, Store};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

use crate::fetch::Transport;
use crate::request::InterceptedRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Installing,
    Installed,
    Activating,
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
        })
    }
}

/// Outcome of the pre-warm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub failed: Vec<String>,
}

/// Outcome of stale-store eviction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
}

pub struct LifecycleManager {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn CacheStorage>,
    static_store: Store,
    api_store: Store,
    manifest: Vec<Url>,
    state: watch::Sender<LifecycleState>,
}

impl LifecycleManager {
    pub fn new(
        transport: Arc<dyn Transport>, storage: Arc<dyn CacheStorage>, static_store: Store, api_store: Store,
        manifest: Vec<Url>,
    ) -> Self {
        let (state, _) = watch::channel(LifecycleState::Installing);
        Self { transport, storage, static_store, api_store, manifest, state }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    fn transition(&self, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        tracing::info!(from = %previous, to = %next, "lifecycle transition");
    }

    /// Pre-warm the static store. A failed asset is logged and skipped; the
    /// cache-first path will fetch it on first use.
    pub async fn install(&self) -> InstallReport {
        self.transition(LifecycleState::Installing);

        if let Err(error) = self.static_store.open().await {
            tracing::warn!(store = self.static_store.name(), %error, "failed to open static store");
        }

        let mut report = InstallReport::default();
        for url in &self.manifest {
            if self.precache(url).await {
                report.cached.push(url.to_string());
            } else {
                report.failed.push(url.to_string());
            }
        }

        tracing::info!(
            store = self.static_store.name(),
            cached = report.cached.len(),
            failed = report.failed.len(),
            "pre-warm finished"
        );

        // Supersede any previous instance without waiting for its clients.
        self.transition(LifecycleState::Installed);
        report
    }

    async fn precache(&self, url: &Url) -> bool {
        let request = InterceptedRequest::get(url.clone());
        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%url, %error, "pre-warm fetch failed");
                return false;
            }
        };

        if !response.is_cacheable_asset() {
            tracing::warn!(%url, status = response.status, kind = %response.kind, "pre-warm response not cacheable");
            return false;
        }

        match self.static_store.put(&request.identity(&[]), &response).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%url, %error, "pre-warm write failed");
                false
            }
        }
    }

    /// Delete every store other than the two current ones, then take control.
    pub async fn activate(&self) -> ActivationReport {
        self.transition(LifecycleState::Activating);

        let current: HashSet<&str> = [self.static_store.name(), self.api_store.name()].into_iter().collect();
        let mut report = ActivationReport::default();

        match self.storage.store_names().await {
            Ok(names) => {
                for name in names {
                    if current.contains(name.as_str()) {
                        report.retained.push(name);
                        continue;
                    }
                    match self.storage.delete_store(&name).await {
                        Ok(_) => {
                            tracing::info!(store = %name, "deleted stale store");
                            report.deleted.push(name);
                        }
                        Err(error) => tracing::warn!(store = %name, %error, "failed to delete stale store"),
                    }
                }
            }
            Err(error) => tracing::warn!(%error, "failed to enumerate stores"),
        }

        if let Err(error) = self.api_store.open().await {
            tracing::warn!(store = self.api_store.name(), %error, "failed to open api store");
        }

        // Claim: requests are handled by this instance from here on, no reload needed.
        self.transition(LifecycleState::Active);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BrokenStorage, ScriptedTransport};
    use lantern_core::{MemoryStorage, RequestIdentity, ResponseSnapshot, StoreRole};

    const HOST: &str = "https://learn.example.com";

    fn url(path: &str) -> Url {
        Url::parse(&format!("{HOST}{path}")).unwrap()
    }

    fn manager(
        transport: ScriptedTransport, storage: Arc<dyn CacheStorage>, version: &str, manifest: &[&str],
    ) -> LifecycleManager {
        LifecycleManager::new(
            Arc::new(transport),
            storage.clone(),
            Store::for_role(storage.clone(), StoreRole::Static, version),
            Store::for_role(storage, StoreRole::Api, version),
            manifest.iter().copied().map(url).collect(),
        )
    }

    #[tokio::test]
    async fn test_install_prewarms_static_store() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let transport = ScriptedTransport::new()
            .route(url("/static/js/bundle.js").as_str(), 200, "js")
            .route(url("/manifest.json").as_str(), 200, "{}");
        let lifecycle = manager(transport, storage.clone(), "v1", &["/static/js/bundle.js", "/manifest.json"]);

        let report = lifecycle.install().await;
        assert_eq!(report.cached.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(lifecycle.state(), LifecycleState::Installed);

        let id = RequestIdentity::get(url("/manifest.json").as_str());
        assert!(storage.lookup("static:v1", &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_install_tolerates_partial_failure() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let transport = ScriptedTransport::new().route(url("/static/js/bundle.js").as_str(), 200, "js");
        let lifecycle = manager(transport, storage.clone(), "v1", &["/static/js/bundle.js", "/logo512.png"]);

        let report = lifecycle.install().await;
        assert_eq!(report.cached, vec![url("/static/js/bundle.js").to_string()]);
        assert_eq!(report.failed, vec![url("/logo512.png").to_string()]);
        assert_eq!(lifecycle.state(), LifecycleState::Installed);
    }

    #[tokio::test]
    async fn test_install_offline_still_completes() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let transport = ScriptedTransport::new();
        transport.set_online(false);
        let lifecycle = manager(transport, storage.clone(), "v1", &["/static/js/bundle.js"]);

        let report = lifecycle.install().await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(storage.store_names().await.unwrap(), vec!["static:v1"]);
    }

    #[tokio::test]
    async fn test_activate_evicts_stale_stores() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let old = RequestIdentity::get(url("/static/js/bundle.js").as_str());
        let snapshot = ResponseSnapshot::html(200, "x");
        for name in ["static:v4", "api:v4", "static:v2-orphan"] {
            storage.put(name, &old, &snapshot).await.unwrap();
        }

        let transport = ScriptedTransport::new().route(url("/static/js/bundle.js").as_str(), 200, "js");
        let lifecycle = manager(transport, storage.clone(), "v5", &["/static/js/bundle.js"]);
        lifecycle.install().await;
        let report = lifecycle.activate().await;

        assert_eq!(storage.store_names().await.unwrap(), vec!["api:v5", "static:v5"]);
        assert_eq!(report.deleted, vec!["api:v4", "static:v2-orphan", "static:v4"]);
        assert_eq!(report.retained, vec!["static:v5"]);
        assert_eq!(lifecycle.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_activate_same_version_keeps_entries() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let id = RequestIdentity::get(url("/api/review/today/").as_str());
        storage.put("api:v1", &id, &ResponseSnapshot::html(200, "kept")).await.unwrap();

        let lifecycle = manager(ScriptedTransport::new(), storage.clone(), "v1", &[]);
        lifecycle.install().await;
        let report = lifecycle.activate().await;

        assert!(report.deleted.is_empty());
        assert!(storage.lookup("api:v1", &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_state_is_observable() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let lifecycle = manager(ScriptedTransport::new(), storage, "v1", &[]);
        let mut rx = lifecycle.subscribe();
        assert_eq!(*rx.borrow(), LifecycleState::Installing);

        lifecycle.install().await;
        lifecycle.activate().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_broken_storage_still_activates() {
        let lifecycle = manager(ScriptedTransport::new(), Arc::new(BrokenStorage), "v1", &[]);
        lifecycle.install().await;
        let report = lifecycle.activate().await;
        assert!(report.deleted.is_empty());
        assert_eq!(lifecycle.state(), LifecycleState::Active);
    }
}
