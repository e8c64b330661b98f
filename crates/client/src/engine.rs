//! The running interception engine.
//!
//! [`Engine::start`] wires classifier, stores, dispatcher, lifecycle and the
//! control channel from an [`AppConfig`], pre-warms, evicts stale stores and
//! returns an engine that is already active.

use lantern_core::{AppConfig, CacheStorage, Error, ResponseSnapshot, Store, StoreRole};
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

use crate::classify::Classifier;
use crate::dispatcher::{Dispatcher, Served};
use crate::fetch::{Transport, resolve};
use crate::invalidation::{ControlMessage, ControlSender, InvalidationChannel};
use crate::lifecycle::{ActivationReport, InstallReport, LifecycleManager, LifecycleState};
use crate::request::InterceptedRequest;

pub struct Engine {
    origin: Url,
    dispatcher: Dispatcher,
    lifecycle: LifecycleManager,
    control: ControlSender,
    vary_headers: Vec<String>,
    install: InstallReport,
    activation: ActivationReport,
}

impl Engine {
    /// Build every component, install, activate and start the control listener.
    ///
    /// Fails only on configuration that cannot be turned into a working engine
    /// (bad origin, manifest entry or pattern). Network and storage problems
    /// during startup are logged and reflected in the reports.
    pub async fn start(
        config: &AppConfig, storage: Arc<dyn CacheStorage>, transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let classifier = Classifier::from_config(config)?;

        let static_store = Store::new(storage.clone(), config.store_name(StoreRole::Static));
        let api_store = Store::new(storage.clone(), config.store_name(StoreRole::Api));

        let offline_url = resolve_on(&origin, &config.offline_document)?;
        let mut manifest = config
            .precache_manifest
            .iter()
            .map(|entry| resolve_on(&origin, entry))
            .collect::<Result<Vec<_>, _>>()?;
        if !manifest.contains(&offline_url) {
            manifest.push(offline_url.clone());
        }

        let offline_identity = InterceptedRequest::get(offline_url).identity(&[]);
        let dispatcher = Dispatcher::new(transport.clone(), classifier, static_store.clone(), api_store.clone())
            .with_offline_document(offline_identity)
            .with_offline_message(&config.offline_message)
            .with_vary_headers(config.vary_headers.clone());

        let lifecycle = LifecycleManager::new(transport, storage, static_store, api_store.clone(), manifest);

        let install = lifecycle.install().await;
        let activation = lifecycle.activate().await;

        let (control, _listener) = InvalidationChannel::new(api_store, config.invalidation_patterns.clone()).spawn();

        tracing::info!(
            origin = %origin,
            static_store = dispatcher.static_store().name(),
            api_store = dispatcher.api_store().name(),
            precached = install.cached.len(),
            evicted = activation.deleted.len(),
            "engine active"
        );

        Ok(Self { origin, dispatcher, lifecycle, control, vary_headers: config.vary_headers.clone(), install, activation })
    }

    /// Answer an intercepted request. Never fails.
    pub async fn fetch(&self, request: InterceptedRequest) -> Served {
        self.dispatcher.handle(request).await
    }

    /// Fire-and-forget delivery to the control channel.
    pub fn post_message(&self, message: ControlMessage) {
        self.control.post(message);
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn store(&self, role: StoreRole) -> &Store {
        match role {
            StoreRole::Static => self.dispatcher.static_store(),
            StoreRole::Api => self.dispatcher.api_store(),
        }
    }

    pub fn install_report(&self) -> &InstallReport {
        &self.install
    }

    pub fn activation_report(&self) -> &ActivationReport {
        &self.activation
    }

    /// Resolve a possibly relative URL against the origin.
    pub fn resolve(&self, input: &str) -> Result<Url, Error> {
        resolve_on(&self.origin, input)
    }

    /// Cached response for `request` in the current store of `role`, without
    /// touching the network.
    pub async fn lookup(&self, role: StoreRole, request: &InterceptedRequest) -> Result<Option<ResponseSnapshot>, Error> {
        let identity = match role {
            StoreRole::Static => request.identity(&[]),
            StoreRole::Api => request.identity(&self.vary_headers),
        };
        self.store(role).lookup(&identity).await
    }
}

fn resolve_on(origin: &Url, input: &str) -> Result<Url, Error> {
    resolve(origin, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))
}
