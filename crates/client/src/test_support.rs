//! In-process transport and storage doubles for engine tests.

use async_trait::async_trait;
use lantern_core::{CacheStorage, Error, RequestIdentity, ResponseKind, ResponseSnapshot};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

use crate::fetch::{Transport, TransportError, response_kind};
use crate::request::InterceptedRequest;

/// Answers from a fixed route table; unknown URLs get a 404.
///
/// With an origin set, routes registered as `basic` are labelled the way
/// [`crate::fetch::FetchClient`] labels them.
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, ResponseSnapshot>>,
    online: AtomicBool,
    latency: Option<Duration>,
    origin: Option<Url>,
    log: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            latency: None,
            origin: None,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(Url::parse(origin).unwrap());
        self
    }

    pub fn route(self, url: &str, status: u16, body: &str) -> Self {
        self.set_route(url, status, body);
        self
    }

    pub fn set_route(&self, url: &str, status: u16, body: &str) {
        let response = ResponseSnapshot::new(status, ResponseKind::Basic, vec![], body.to_string());
        self.set_response(url, response);
    }

    pub fn set_response(&self, url: &str, response: ResponseSnapshot) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|line| line.ends_with(url)).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, TransportError> {
        self.log.lock().unwrap().push(format!("{} {}", request.method, request.url));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.online.load(Ordering::SeqCst) {
            return Err(TransportError::Offline);
        }
        let routed = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        let mut response = routed.unwrap_or_else(|| ResponseSnapshot::new(404, ResponseKind::Basic, vec![], "missing"));
        if response.kind == ResponseKind::Basic {
            response.kind = response_kind(self.origin.as_ref(), request, &request.url);
        }
        Ok(response)
    }
}

/// Storage whose every operation fails, as when the platform store is unavailable.
pub struct BrokenStorage;

fn unavailable() -> Error {
    Error::InvalidInput("storage unavailable".into())
}

#[async_trait]
impl CacheStorage for BrokenStorage {
    async fn open(&self, _store: &str) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        Err(unavailable())
    }

    async fn delete_store(&self, _store: &str) -> Result<bool, Error> {
        Err(unavailable())
    }

    async fn put(&self, _store: &str, _identity: &RequestIdentity, _response: &ResponseSnapshot) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn lookup(&self, _store: &str, _identity: &RequestIdentity) -> Result<Option<ResponseSnapshot>, Error> {
        Err(unavailable())
    }

    async fn keys(&self, _store: &str) -> Result<Vec<RequestIdentity>, Error> {
        Err(unavailable())
    }

    async fn delete(&self, _store: &str, _identity: &RequestIdentity) -> Result<bool, Error> {
        Err(unavailable())
    }
}
