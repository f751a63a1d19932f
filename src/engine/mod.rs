//! Broker engine contract and broker configuration factory.
//!
//! The engine is the one true external dependency of this crate: the thing
//! that actually accepts connections, persists messages and forms clusters.
//! The supervisor consumes it only through the narrow [`Engine`] trait, which
//! keeps the lifecycle logic unit-testable with a scripted fake.
//!
//! ## Contents
//! - [`Engine`] — async lifecycle contract consumed by the supervisor
//! - [`BrokerSettings`], [`Acceptor`] — programmatic configuration
//! - [`BrokerConfig`] — factory output, built from a [`Resolution`](crate::Resolution)

mod contract;
mod settings;

pub use contract::Engine;
pub use settings::{broker_config, Acceptor, BrokerConfig, BrokerSettings};
