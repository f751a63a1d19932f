//! # brokervisor
//!
//! **Brokervisor** is a lifecycle supervisor for an embedded message broker.
//!
//! It adapts a broker engine to the managed-component protocol a host
//! application drives at boot and shutdown: resolve the broker's
//! configuration source, start the broker asynchronously so the host's boot
//! sequence is never blocked, expose a bounded-wait readiness check, and
//! tear the broker down fault-tolerantly.
//!
//! ## Architecture
//! ```text
//!  host framework
//!       │  init(bag) / start() / wait_for_start(t) / stop() / destroy()
//!       ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  BrokerSupervisor (lifecycle state machine)                   │
//! │  - StateCell (atomic lifecycle state)                         │
//! │  - Bus (broadcast events) ──► SubscriberSet ──► Subscribe...  │
//! │  - lifecycle mutex (serializes start vs stop)                 │
//! └──────┬───────────────────────────────┬────────────────────────┘
//!        │ background start task         │ queries
//!        ▼                               ▼
//!   resolve(bag, catalog)          Engine (trait)
//!   broker_config(resolution)      - is_active() / describe()
//!   engine.apply_* / start /       - the actual embedded broker,
//!   wait_cluster_forming           external to this crate
//! ```
//!
//! ## Lifecycle
//! ```text
//! Uninitialized ──init──► Initialized ──start──► Starting ──► Running
//!                                                    │
//!                                                    └──────► Failed
//! (any state) ──stop──► Stopped      (any state) ──destroy──► Destroyed
//! ```
//!
//! `start()` returning does **not** imply the broker is active: the real
//! startup (configuration resolution, engine start, a bounded
//! cluster-formation wait) runs on a background task, and its failures are
//! contained — logged and published on the event bus, never propagated to
//! the caller. Callers that need a guarantee poll with
//! [`BrokerSupervisor::wait_for_start`].
//!
//! If no configuration resource is discoverable (neither the one named by
//! `activemq.config.filename` nor the default `broker.xml`), the broker is
//! started with a minimal zero-config setup: security disabled, an
//! in-process acceptor and a loopback TCP acceptor. Availability wins over
//! strict configuration fidelity.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use brokervisor::{BrokerSettings, BrokerSupervisor, Config, ConfigBag, Engine, EngineError};
//!
//! /// A stand-in engine; a real integration wraps an actual broker.
//! struct NullEngine {
//!     active: AtomicBool,
//! }
//!
//! #[async_trait]
//! impl Engine for NullEngine {
//!     async fn apply_resource(&self, _resource: &str) -> Result<(), EngineError> { Ok(()) }
//!     async fn apply_settings(&self, _settings: BrokerSettings) -> Result<(), EngineError> { Ok(()) }
//!     async fn start(&self) -> Result<(), EngineError> {
//!         self.active.store(true, Ordering::Release);
//!         Ok(())
//!     }
//!     async fn stop(&self) -> Result<(), EngineError> {
//!         self.active.store(false, Ordering::Release);
//!         Ok(())
//!     }
//!     async fn wait_cluster_forming(
//!         &self,
//!         _timeout: Duration,
//!         _expected: u32,
//!         _min_live: u32,
//!     ) -> Result<(), EngineError> {
//!         Ok(())
//!     }
//!     fn is_active(&self) -> bool {
//!         self.active.load(Ordering::Acquire)
//!     }
//!     fn describe(&self) -> Result<String, EngineError> {
//!         Ok("null-broker".to_string())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let supervisor = BrokerSupervisor::builder(Config::default(), || {
//!         Ok(NullEngine { active: AtomicBool::new(false) })
//!     })
//!     .build();
//!
//!     supervisor.init(ConfigBag::new())?;
//!     supervisor.start(); // returns immediately
//!     supervisor.wait_for_start(Duration::from_secs(60)).await?;
//!
//!     println!("{}", supervisor.describe()?);
//!
//!     supervisor.stop().await; // never raises
//!     supervisor.destroy().await;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod engine;
mod error;
mod events;
mod resolve;
mod subscribers;

// ---- Public re-exports ----

pub use config::{ClusterFormation, Config, ConfigBag, CONFIG_RESOURCE_KEY, DEFAULT_CONFIG_RESOURCE};
pub use core::{BrokerSupervisor, BrokerSupervisorBuilder, LifecycleState};
pub use engine::{broker_config, Acceptor, BrokerConfig, BrokerSettings, Engine};
pub use error::{EngineError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use resolve::{resolve, DirCatalog, Resolution, ResourceCatalog};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
