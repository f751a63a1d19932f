//! # Wiring a supervisor: config, engine factory, catalog, subscribers.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::config::Config;
use crate::engine::Engine;
use crate::events::Bus;
use crate::resolve::{DirCatalog, ResourceCatalog};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::supervisor::{BrokerSupervisor, EngineFactory};

/// Builder for constructing a [`BrokerSupervisor`].
///
/// Obtained via [`BrokerSupervisor::builder`]. The resource catalog defaults
/// to a [`DirCatalog`] over the process working directory; subscribers
/// default to none.
pub struct BrokerSupervisorBuilder<E: Engine> {
    cfg: Config,
    factory: EngineFactory<E>,
    catalog: Arc<dyn ResourceCatalog>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<E: Engine> BrokerSupervisorBuilder<E> {
    pub(crate) fn new(cfg: Config, factory: EngineFactory<E>) -> Self {
        Self {
            cfg,
            factory,
            catalog: Arc::new(DirCatalog::default()),
            subscribers: Vec::new(),
        }
    }

    /// Sets the catalog used to discover configuration resources.
    pub fn with_catalog(mut self, catalog: Arc<dyn ResourceCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (resolution, startup outcome,
    /// suppressed stop faults) through dedicated workers with bounded
    /// queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor and starts its event fan-out.
    ///
    /// Must be called within a tokio runtime: the subscriber workers and
    /// the bus listener are spawned here.
    pub fn build(self) -> BrokerSupervisor<E> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers));

        subscriber_listener(&bus, Arc::clone(&subs));

        BrokerSupervisor::new_internal(self.cfg, self.factory, self.catalog, bus, subs)
    }
}

/// Subscribes to the bus and forwards events to the subscriber set
/// (fire-and-forget). The listener exits when the bus closes.
fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });
}
