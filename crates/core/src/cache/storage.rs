//! The persistent cache primitive the engine is written against.

use async_trait::async_trait;

use super::identity::RequestIdentity;
use super::snapshot::ResponseSnapshot;
use crate::Error;

/// A collection of named stores, each mapping [`RequestIdentity`] to
/// [`ResponseSnapshot`].
///
/// Writes are atomic per entry: a reader sees either the previous snapshot or
/// the new one, never a mix. Nothing here coordinates across entries.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if it does not exist.
    async fn open(&self, store: &str) -> Result<(), Error>;

    /// Names of all existing stores, sorted.
    async fn store_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and every entry in it. Returns false if it did not exist.
    async fn delete_store(&self, store: &str) -> Result<bool, Error>;

    /// Insert or overwrite an entry, creating the store if needed.
    async fn put(&self, store: &str, identity: &RequestIdentity, response: &ResponseSnapshot) -> Result<(), Error>;

    async fn lookup(&self, store: &str, identity: &RequestIdentity) -> Result<Option<ResponseSnapshot>, Error>;

    /// Identities of every entry in the store, ordered by URL.
    async fn keys(&self, store: &str) -> Result<Vec<RequestIdentity>, Error>;

    /// Delete one entry. Returns false if it did not exist.
    async fn delete(&self, store: &str, identity: &RequestIdentity) -> Result<bool, Error>;
}
