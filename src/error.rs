//! Error types used by the supervisor and the broker engine contract.
//!
//! This module defines two main error enums:
//!
//! - [`SupervisorError`] — errors surfaced to callers of the lifecycle API.
//! - [`EngineError`] — errors raised by the underlying broker engine.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//!
//! ## Propagation policy
//! Faults during best-effort phases (the background start sequence, `stop`)
//! are contained: logged, published on the event bus, never returned. Only
//! `init`, `wait_for_start` and `describe` return errors to their callers.

use std::time::Duration;
use thiserror::Error;

/// # Errors surfaced by the lifecycle supervisor.
///
/// These are the only faults a caller of the supervisor API can observe.
/// Background startup failures never appear here; they move the supervisor
/// to the `Failed` state and are reported through logs and events.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The broker did not report active within the readiness budget.
    ///
    /// Returned by `wait_for_start`; detection latency is bounded by the
    /// configured poll interval, so the actual wait may exceed `timeout`
    /// by up to one interval.
    #[error("broker did not become active within {timeout:?}")]
    ReadinessTimeout {
        /// The readiness budget that was exceeded.
        timeout: Duration,
    },

    /// The underlying broker engine reported a fault.
    ///
    /// Raised from `init` (engine construction) and `describe` (identity
    /// formatting); never from `start` or `stop`.
    #[error("broker engine fault: {0}")]
    Engine(#[from] EngineError),

    /// The lifecycle operation requires `init` to have been called first.
    #[error("broker not initialized")]
    NotInitialized,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use brokervisor::SupervisorError;
    /// use std::time::Duration;
    ///
    /// let err = SupervisorError::ReadinessTimeout { timeout: Duration::from_millis(50) };
    /// assert_eq!(err.as_label(), "readiness_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::ReadinessTimeout { .. } => "readiness_timeout",
            SupervisorError::Engine(_) => "engine_fault",
            SupervisorError::NotInitialized => "not_initialized",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::ReadinessTimeout { timeout } => {
                format!("readiness timeout after {timeout:?}")
            }
            SupervisorError::Engine(e) => format!("engine: {e}"),
            SupervisorError::NotInitialized => "not initialized".to_string(),
        }
    }
}

/// # Errors produced by the broker engine.
///
/// These classify the faults an [`Engine`](crate::Engine) implementation may
/// raise across the narrow lifecycle contract. The supervisor treats most of
/// them as contained: a start-path fault moves the instance to `Failed`, a
/// stop-path fault is swallowed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EngineError {
    /// Applying a configuration (resource path or programmatic) failed.
    #[error("configuration rejected: {reason}")]
    Config {
        /// The underlying engine message.
        reason: String,
    },

    /// The engine failed to start.
    #[error("engine start failed: {reason}")]
    Start {
        /// The underlying engine message.
        reason: String,
    },

    /// The engine failed to stop.
    ///
    /// Swallowed by the supervisor's `stop`; observable only through logs
    /// and the `StopFaultIgnored` event.
    #[error("engine stop failed: {reason}")]
    Stop {
        /// The underlying engine message.
        reason: String,
    },

    /// Cluster formation did not complete within the configured bound.
    #[error("cluster did not form within {timeout:?} (expected {expected}, min live {min_live})")]
    ClusterTimeout {
        /// The cluster-formation budget that was exceeded.
        timeout: Duration,
        /// Expected cluster size.
        expected: u32,
        /// Minimum live members required.
        min_live: u32,
    },

    /// The broker's identity string could not be produced.
    #[error("broker identity unavailable: {reason}")]
    Identity {
        /// The underlying engine message.
        reason: String,
    },
}

impl EngineError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::Config { .. } => "engine_config",
            EngineError::Start { .. } => "engine_start",
            EngineError::Stop { .. } => "engine_stop",
            EngineError::ClusterTimeout { .. } => "engine_cluster_timeout",
            EngineError::Identity { .. } => "engine_identity",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EngineError::Config { reason } => format!("config: {reason}"),
            EngineError::Start { reason } => format!("start: {reason}"),
            EngineError::Stop { reason } => format!("stop: {reason}"),
            EngineError::ClusterTimeout {
                timeout,
                expected,
                min_live,
            } => {
                format!(
                    "cluster formation timed out after {timeout:?} (expected={expected}, min_live={min_live})"
                )
            }
            EngineError::Identity { reason } => format!("identity: {reason}"),
        }
    }
}
