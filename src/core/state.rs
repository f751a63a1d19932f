//! # Atomic lifecycle state shared with the background start task.
//!
//! The supervisor records where the broker is in its lifecycle in a single
//! atomic cell. The background start task writes the terminal startup
//! outcome (`Running` or `Failed`) into the same cell, which is what makes
//! fire-and-forget startup observable without blocking anyone.
//!
//! ## Transitions
//! ```text
//! Uninitialized ──init──► Initialized ──start──► Starting ──► Running
//!                                                    │
//!                                                    └──────► Failed
//! (any state) ──stop──► Stopped      (any state) ──destroy──► Destroyed
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Where the supervised broker is in its lifecycle.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// `init` has not been called; the readiness predicate is always false.
    Uninitialized = 0,
    /// The engine handle exists but has not been started.
    Initialized = 1,
    /// `start` returned; the background start sequence is in flight.
    Starting = 2,
    /// Startup and cluster formation completed.
    Running = 3,
    /// The background start sequence failed; see logs and events.
    Failed = 4,
    /// `stop` completed (engine stop faults included, they are suppressed).
    Stopped = 5,
    /// `destroy` released the engine handle.
    Destroyed = 6,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Failed => "failed",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Lock-free cell holding the current [`LifecycleState`].
///
/// Writers are the supervisor (caller's thread) and the single background
/// start task; readers may be anywhere.
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::Uninitialized as u8))
    }

    pub(crate) fn load(&self) -> LifecycleState {
        match self.0.load(Ordering::Acquire) {
            0 => LifecycleState::Uninitialized,
            1 => LifecycleState::Initialized,
            2 => LifecycleState::Starting,
            3 => LifecycleState::Running,
            4 => LifecycleState::Failed,
            5 => LifecycleState::Stopped,
            _ => LifecycleState::Destroyed,
        }
    }

    pub(crate) fn store(&self, state: LifecycleState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_round_trips_every_state() {
        let cell = StateCell::new();
        assert_eq!(cell.load(), LifecycleState::Uninitialized);

        for state in [
            LifecycleState::Initialized,
            LifecycleState::Starting,
            LifecycleState::Running,
            LifecycleState::Failed,
            LifecycleState::Stopped,
            LifecycleState::Destroyed,
        ] {
            cell.store(state);
            assert_eq!(cell.load(), state);
        }
    }
}
