//! # The lifecycle contract consumed from the broker engine.
//!
//! Everything the supervisor needs from a broker fits in seven operations:
//! configure (by resource path or programmatically), start, stop, bounded
//! cluster-formation wait, an active-state predicate, and an identity query.
//! Engine internals never leak past this trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::EngineError;

use super::BrokerSettings;

/// # Embedded broker engine.
///
/// Implementations wrap a concrete broker. The supervisor drives the
/// lifecycle methods; configuration is applied exactly once, before `start`.
///
/// ## Contract
/// - `apply_resource` / `apply_settings` are alternatives, not a sequence:
///   the supervisor calls exactly one of them per start attempt.
/// - `is_active` must be cheap; it is polled on the `wait_for_start` path.
/// - `stop` must be safe to call when the engine never started.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// Points the engine at a named configuration resource.
    ///
    /// The engine parses the resource itself; discoverability was already
    /// checked during resolution.
    async fn apply_resource(&self, resource: &str) -> Result<(), EngineError>;

    /// Applies a programmatic configuration.
    async fn apply_settings(&self, settings: BrokerSettings) -> Result<(), EngineError>;

    /// Starts the engine.
    async fn start(&self) -> Result<(), EngineError>;

    /// Stops the engine.
    async fn stop(&self) -> Result<(), EngineError>;

    /// Waits for the engine's internal cluster-formation step.
    ///
    /// Returns [`EngineError::ClusterTimeout`] if the cluster did not reach
    /// `min_live` live members out of `expected` within `timeout`.
    async fn wait_cluster_forming(
        &self,
        timeout: Duration,
        expected: u32,
        min_live: u32,
    ) -> Result<(), EngineError>;

    /// True once the broker is accepting work.
    fn is_active(&self) -> bool;

    /// Returns a human-readable identity string for the broker.
    fn describe(&self) -> Result<String, EngineError>;
}
