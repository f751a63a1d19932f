//! Observability fan-out: subscriber trait, set, and a built-in log writer.
//!
//! Lifecycle events are the only channel through which best-effort faults
//! (background startup failures, suppressed stop faults) become visible to
//! the host, so subscribers are where operators hook in logging, metrics or
//! alerting.
//!
//! ## Contents
//! - [`Subscribe`] — the extension-point trait for custom handlers
//! - [`SubscriberSet`] — non-blocking fan-out with per-subscriber queues
//! - [`LogWriter`] — built-in subscriber that logs events through `tracing`

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
