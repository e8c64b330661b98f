//! Strategy dispatch for intercepted requests.
//!
//! | category             | strategy                                   |
//! |----------------------|--------------------------------------------|
//! | `document`           | network, then cached offline page, then inline page |
//! | `static-asset`       | cache-first, store-then-return on miss     |
//! | `api-credentialed`   | network-first, GET write-through, cache on failure |
//! | `api-uncredentialed` | cache-first with background revalidation   |
//!
//! Only transport failure triggers a fallback. A 4xx/5xx from a reachable
//! server is returned as-is and never touches the cache. Store errors are
//! logged and otherwise ignored, so [`Dispatcher::handle`] always yields a
//! response.

use lantern_core::{RequestIdentity, ResponseSnapshot, Store};
use std::sync::Arc;

use crate::classify::{Category, Classifier};
use crate::fetch::Transport;
use crate::offline;
use crate::request::InterceptedRequest;

/// Where the returned response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    Synthetic,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Synthetic => "synthetic",
        }
    }
}

/// A response together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: ResponseSnapshot,
    pub source: ResponseSource,
    pub category: Category,
}

/// Per-request strategy executor. Cheap to clone; clones share stores and transport.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    classifier: Arc<Classifier>,
    static_store: Store,
    api_store: Store,
    offline_document: Option<RequestIdentity>,
    offline_message: Arc<str>,
    vary_headers: Arc<[String]>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, classifier: Classifier, static_store: Store, api_store: Store) -> Self {
        Self {
            transport,
            classifier: Arc::new(classifier),
            static_store,
            api_store,
            offline_document: None,
            offline_message: Arc::from("Network unavailable"),
            vary_headers: Arc::from(Vec::new()),
        }
    }

    /// Static-store entry served when a navigation fails.
    pub fn with_offline_document(mut self, identity: RequestIdentity) -> Self {
        self.offline_document = Some(identity);
        self
    }

    pub fn with_offline_message(mut self, message: &str) -> Self {
        self.offline_message = Arc::from(message);
        self
    }

    /// Request headers that take part in API store identities. Static and
    /// document entries are keyed by method and URL alone.
    pub fn with_vary_headers(mut self, headers: Vec<String>) -> Self {
        self.vary_headers = Arc::from(headers);
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn static_store(&self) -> &Store {
        &self.static_store
    }

    pub fn api_store(&self) -> &Store {
        &self.api_store
    }

    /// Classify and answer a request.
    pub async fn handle(&self, request: InterceptedRequest) -> Served {
        let category = self.classifier.classify(&request);
        let identity = match category {
            Category::ApiCredentialed | Category::ApiUncredentialed => request.identity(&self.vary_headers),
            Category::Document | Category::StaticAsset => request.identity(&[]),
        };

        let (response, source) = match category {
            Category::Document => self.network_with_fallback(&request).await,
            Category::StaticAsset => self.cache_first(&request, &identity).await,
            Category::ApiCredentialed => self.network_first(&request, &identity).await,
            Category::ApiUncredentialed => self.stale_while_revalidate(request.clone(), identity).await,
        };

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            category = category.as_str(),
            source = source.as_str(),
            status = response.status,
            "served"
        );

        Served { response, source, category }
    }

    /// Documents never come from cache on the happy path.
    async fn network_with_fallback(&self, request: &InterceptedRequest) -> (ResponseSnapshot, ResponseSource) {
        match self.transport.send(request).await {
            Ok(response) => (response, ResponseSource::Network),
            Err(error) => {
                tracing::warn!(url = %request.url, %error, "navigation failed, serving offline document");
                if let Some(fallback) = &self.offline_document
                    && let Some(cached) = read(&self.static_store, fallback).await
                {
                    return (cached, ResponseSource::Cache);
                }
                (offline::offline_document(), ResponseSource::Synthetic)
            }
        }
    }

    async fn cache_first(
        &self, request: &InterceptedRequest, identity: &RequestIdentity,
    ) -> (ResponseSnapshot, ResponseSource) {
        if request.is_get()
            && let Some(cached) = read(&self.static_store, identity).await
        {
            tracing::debug!(url = %request.url, "static cache hit");
            return (cached, ResponseSource::Cache);
        }

        match self.transport.send(request).await {
            Ok(response) => {
                // Persist before handing the response back.
                if request.is_get() && response.is_cacheable_asset() {
                    write(&self.static_store, identity, &response).await;
                }
                (response, ResponseSource::Network)
            }
            Err(error) => {
                tracing::debug!(url = %request.url, %error, "static asset unavailable");
                (offline::asset_not_found(), ResponseSource::Synthetic)
            }
        }
    }

    async fn network_first(
        &self, request: &InterceptedRequest, identity: &RequestIdentity,
    ) -> (ResponseSnapshot, ResponseSource) {
        match self.transport.send(request).await {
            Ok(response) => {
                if request.is_get() && response.is_ok() {
                    write(&self.api_store, identity, &response).await;
                }
                (response, ResponseSource::Network)
            }
            Err(error) => {
                tracing::debug!(url = %request.url, %error, "network-first request failed");
                if request.is_get()
                    && let Some(cached) = read(&self.api_store, identity).await
                {
                    return (cached, ResponseSource::Cache);
                }
                (offline::api_unavailable(&self.offline_message), ResponseSource::Synthetic)
            }
        }
    }

    async fn stale_while_revalidate(
        &self, request: InterceptedRequest, identity: RequestIdentity,
    ) -> (ResponseSnapshot, ResponseSource) {
        if request.is_get()
            && let Some(cached) = read(&self.api_store, &identity).await
        {
            self.revalidate(request, identity);
            return (cached, ResponseSource::Cache);
        }

        match self.transport.send(&request).await {
            Ok(response) => {
                if request.is_get() && response.status == 200 {
                    write(&self.api_store, &identity, &response).await;
                }
                (response, ResponseSource::Network)
            }
            Err(error) => {
                tracing::debug!(url = %request.url, %error, "api request failed with no cached copy");
                (offline::api_unavailable(&self.offline_message), ResponseSource::Synthetic)
            }
        }
    }

    /// Detached refetch whose result only ever reaches the store. Concurrent
    /// revalidations of the same resource are not coalesced.
    fn revalidate(&self, request: InterceptedRequest, identity: RequestIdentity) {
        let transport = Arc::clone(&self.transport);
        let store = self.api_store.clone();
        tokio::spawn(async move {
            match transport.send(&request).await {
                Ok(response) if response.status == 200 => write(&store, &identity, &response).await,
                Ok(response) => {
                    tracing::debug!(url = %request.url, status = response.status, "revalidation not stored")
                }
                Err(error) => tracing::debug!(url = %request.url, %error, "revalidation failed"),
            }
        });
    }
}

async fn read(store: &Store, identity: &RequestIdentity) -> Option<ResponseSnapshot> {
    match store.lookup(identity).await {
        Ok(found) => found,
        Err(error) => {
            tracing::warn!(store = store.name(), %identity, %error, "cache read failed");
            None
        }
    }
}

async fn write(store: &Store, identity: &RequestIdentity, response: &ResponseSnapshot) {
    if let Err(error) = store.put(identity, response).await {
        tracing::warn!(store = store.name(), %identity, %error, "cache write failed");
    }
}
