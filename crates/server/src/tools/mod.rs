//! MCP tool implementations.
//!
//! This module contains all tools exposed by the lantern server.

pub mod cache;
pub mod control;
pub mod fetch;

#[cfg(test)]
pub mod testing;

pub use control::{PostMessageParams, post_message_impl};
pub use fetch::{FetchParams, fetch_impl};
