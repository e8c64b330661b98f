//! Cache inspection tools.
//!
//! Read-only views of the stores the engine writes to.

pub mod get;
pub mod stores;

pub use get::{CacheGetParams, get_impl};
pub use stores::stores_impl;
