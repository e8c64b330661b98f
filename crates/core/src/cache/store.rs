//! Named store handles.
//!
//! A [`Store`] is what the engine is handed instead of reaching for a global:
//! a store name bound to a shared [`CacheStorage`].

use std::fmt;
use std::sync::Arc;

use super::identity::RequestIdentity;
use super::snapshot::ResponseSnapshot;
use super::storage::CacheStorage;
use crate::Error;

/// The two logical roles a store can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreRole {
    /// Bundles, scripts, styles, icons.
    Static,
    /// Successful GET responses to API calls.
    Api,
}

impl StoreRole {
    pub fn prefix(&self) -> &'static str {
        match self {
            StoreRole::Static => "static",
            StoreRole::Api => "api",
        }
    }

    /// Store name for this role at `version`, e.g. `static:v5`.
    pub fn versioned(&self, version: &str) -> String {
        format!("{}:{version}", self.prefix())
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl std::str::FromStr for StoreRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(StoreRole::Static),
            "api" => Ok(StoreRole::Api),
            other => Err(Error::InvalidInput(format!("unknown store role: {other}"))),
        }
    }
}

/// A store name bound to the storage backend.
#[derive(Clone)]
pub struct Store {
    name: String,
    backend: Arc<dyn CacheStorage>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(backend: Arc<dyn CacheStorage>, name: impl Into<String>) -> Self {
        Self { name: name.into(), backend }
    }

    pub fn for_role(backend: Arc<dyn CacheStorage>, role: StoreRole, version: &str) -> Self {
        Self::new(backend, role.versioned(version))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn open(&self) -> Result<(), Error> {
        self.backend.open(&self.name).await
    }

    pub async fn put(&self, identity: &RequestIdentity, response: &ResponseSnapshot) -> Result<(), Error> {
        self.backend.put(&self.name, identity, response).await
    }

    pub async fn lookup(&self, identity: &RequestIdentity) -> Result<Option<ResponseSnapshot>, Error> {
        self.backend.lookup(&self.name, identity).await
    }

    pub async fn keys(&self) -> Result<Vec<RequestIdentity>, Error> {
        self.backend.keys(&self.name).await
    }

    pub async fn delete(&self, identity: &RequestIdentity) -> Result<bool, Error> {
        self.backend.delete(&self.name, identity).await
    }
}
