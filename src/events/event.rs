//! # Lifecycle events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Resolution events**: which configuration source was chosen
//! - **Startup events**: background start progress and outcome
//! - **Teardown events**: stop/destroy progress, including suppressed faults
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! resolved resource name and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use brokervisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StartupFailed).with_reason("engine start failed: boom");
//!
//! assert_eq!(ev.kind, EventKind::StartupFailed);
//! assert_eq!(ev.reason.as_deref(), Some("engine start failed: boom"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Resolution events ===
    /// A configuration resource was resolved for this start attempt.
    ///
    /// Sets:
    /// - `resource`: resolved resource name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ConfigResolved,

    /// No discoverable resource; the minimal configuration applies.
    ///
    /// Sets:
    /// - `resource`: the requested resource, when one was configured
    /// - `reason`: why the fallback happened
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ConfigFallback,

    // === Startup events ===
    /// The background start sequence has begun.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    BrokerStarting,

    /// The broker completed startup and cluster formation.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    BrokerActive,

    /// The background start sequence failed; the supervisor is now `Failed`.
    ///
    /// Never propagated to the caller of `start()`; this event and the log
    /// line are the only places the failure is visible.
    ///
    /// Sets:
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StartupFailed,

    // === Teardown events ===
    /// The engine stopped cleanly.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    BrokerStopped,

    /// The engine raised a fault during stop; it was suppressed.
    ///
    /// Sets:
    /// - `reason`: suppressed fault message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StopFaultIgnored,

    /// The supervisor released its resources.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    BrokerDestroyed,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Configuration resource name, if applicable.
    pub resource: Option<Arc<str>>,
    /// Human-readable reason (failures, fallback details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            resource: None,
            reason: None,
        }
    }

    /// Attaches a configuration resource name.
    #[inline]
    pub fn with_resource(mut self, resource: impl Into<Arc<str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for terminal startup outcomes (`BrokerActive` / `StartupFailed`).
    #[inline]
    pub fn is_startup_outcome(&self) -> bool {
        matches!(
            self.kind,
            EventKind::BrokerActive | EventKind::StartupFailed
        )
    }
}
