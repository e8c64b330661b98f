//! Core types and shared functionality for lantern.
//!
//! This crate provides:
//! - Versioned cache stores with SQLite and in-memory backends
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;

pub use bytes::Bytes;
pub use cache::{CacheDb, CacheStorage, MemoryStorage, RequestIdentity, ResponseKind, ResponseSnapshot, Store, StoreRole};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
