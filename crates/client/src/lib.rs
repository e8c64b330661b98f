//! Request interception for lantern.
//!
//! This crate classifies outgoing requests, answers them with a per-category
//! caching strategy, manages store versions across installs and listens for
//! invalidation messages. The server crate hosts it behind MCP tools.

pub mod classify;
pub mod dispatcher;
pub mod engine;
pub mod fetch;
pub mod invalidation;
pub mod lifecycle;
pub mod offline;
pub mod request;

#[cfg(test)]
mod test_support;

pub use classify::{Category, Classifier};
pub use dispatcher::{Dispatcher, ResponseSource, Served};
pub use engine::Engine;
pub use fetch::{FetchClient, FetchConfig, Transport, TransportError};
pub use invalidation::{ControlMessage, ControlSender, InvalidationChannel};
pub use lifecycle::{ActivationReport, InstallReport, LifecycleManager, LifecycleState};
pub use request::{Destination, InterceptedRequest};
