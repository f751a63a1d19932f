//! Runtime core: lifecycle orchestration.
//!
//! This module contains the supervisor that drives the embedded broker
//! through `init → start → stop → destroy`, plus its construction and the
//! shared lifecycle state.
//!
//! Internal modules:
//! - [`supervisor`]: the lifecycle state machine and background start task;
//! - [`builder`]: wires config, engine factory, catalog and subscribers;
//! - [`state`]: atomic lifecycle state shared with the background task.

mod builder;
mod state;
mod supervisor;

pub use builder::BrokerSupervisorBuilder;
pub use state::LifecycleState;
pub use supervisor::BrokerSupervisor;
