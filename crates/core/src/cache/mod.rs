//! Versioned request/response stores.
//!
//! This module provides the persistent cache primitive the interception engine
//! runs on:
//!
//! - Request identities hashed to stable SHA-256 keys
//! - Immutable response snapshots
//! - A [`CacheStorage`] trait with SQLite (WAL, migrations) and in-memory backends
//! - Cloneable [`Store`] handles bound to a versioned name

pub mod connection;
pub mod entries;
pub mod identity;
pub mod memory;
pub mod migrations;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use identity::RequestIdentity;
pub use memory::MemoryStorage;
pub use snapshot::{ResponseKind, ResponseSnapshot};
pub use storage::CacheStorage;
pub use store::{Store, StoreRole};
