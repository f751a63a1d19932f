//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] forwards events to `tracing` in a human-readable format.
//! This is primarily useful for development, debugging, and wiring the
//! supervisor into a host that already ships a `tracing` subscriber.
//!
//! ## Output format
//! ```text
//! config resolved resource=broker.xml
//! broker starting
//! startup failed reason="engine start failed: boom"
//! stop fault ignored reason="engine stop failed: wedged"
//! ```

use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Built-in `tracing`-backed subscriber.
///
/// Failures on best-effort paths (startup, stop) are logged at `warn`,
/// everything else at `info`. Implement a custom [`Subscribe`] for metrics
/// or alerting.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ConfigResolved => {
                info!(resource = e.resource.as_deref(), "config resolved");
            }
            EventKind::ConfigFallback => {
                warn!(
                    resource = e.resource.as_deref(),
                    reason = e.reason.as_deref(),
                    "falling back to minimal configuration"
                );
            }
            EventKind::BrokerStarting => {
                info!("broker starting");
            }
            EventKind::BrokerActive => {
                info!("broker active");
            }
            EventKind::StartupFailed => {
                warn!(reason = e.reason.as_deref(), "startup failed");
            }
            EventKind::BrokerStopped => {
                info!("broker stopped");
            }
            EventKind::StopFaultIgnored => {
                warn!(reason = e.reason.as_deref(), "stop fault ignored");
            }
            EventKind::BrokerDestroyed => {
                info!("broker destroyed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
