//! # Supervisor: drives the embedded broker through its lifecycle.
//!
//! The [`BrokerSupervisor`] owns the one engine handle, the event bus, and
//! the lifecycle state cell. It implements the managed-component protocol
//! the host framework drives at boot/shutdown:
//!
//! ```text
//! host framework:        init(bag) ─► start() ─► [wait_for_start] ─► stop() ─► destroy()
//!                            │           │
//!                            │           └─► spawns background start task:
//!                            │                 resolve(bag, catalog)
//!                            │                 broker_config(resolution)
//!                            │                 engine.apply_*           ┐ any failure:
//!                            │                 engine.start()           ├ logged, published,
//!                            │                 engine.wait_cluster_…    ┘ state = Failed
//!                            │                 state = Running
//!                            └─► engine handle created (exactly once)
//! ```
//!
//! ## Rules
//! - `start()` returns immediately; it never reports background failures.
//!   Callers that need a guarantee poll via [`BrokerSupervisor::wait_for_start`].
//! - `stop()` and `destroy()` never raise; engine stop faults are suppressed
//!   (logged + `StopFaultIgnored` event).
//! - The background start task and `stop`/`destroy` are serialized through a
//!   lifecycle mutex, so stop cannot interleave with configuration
//!   application or engine startup.
//! - The cancellation token lets `stop`/`destroy` void a start attempt that
//!   has not yet begun applying configuration; once past that point the
//!   attempt runs to its terminal outcome before stop proceeds.
//! - Concurrent `start()` calls on the same instance are not a supported
//!   configuration. A second attempt after `stop()` is permitted; the
//!   resolution is recomputed fresh from the same bag.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigBag};
use crate::engine::{broker_config, BrokerConfig, Engine};
use crate::error::{EngineError, SupervisorError};
use crate::events::{Bus, Event, EventKind};
use crate::resolve::{resolve, Resolution, ResourceCatalog};
use crate::subscribers::SubscriberSet;

use super::state::StateCell;
use super::LifecycleState;

/// Constructs the engine at `init` time.
pub(crate) type EngineFactory<E> = Arc<dyn Fn() -> Result<E, EngineError> + Send + Sync>;

/// Lifecycle supervisor for an embedded broker engine.
///
/// Created via [`BrokerSupervisor::builder`]. All lifecycle methods take
/// `&self`; the supervisor is safe to share behind an `Arc` with the host
/// framework, which is expected to drive the hooks sequentially.
pub struct BrokerSupervisor<E: Engine> {
    cfg: Config,
    factory: EngineFactory<E>,
    catalog: Arc<dyn ResourceCatalog>,
    bus: Bus,
    // Keeps the subscriber workers alive for the supervisor's lifetime.
    _subs: Arc<SubscriberSet>,
    state: Arc<StateCell>,
    engine: Mutex<Option<Arc<E>>>,
    bag: Mutex<ConfigBag>,
    runtime: Mutex<Option<Handle>>,
    // Serializes the background start sequence against stop/destroy.
    lifecycle: Arc<AsyncMutex<()>>,
    start_token: Mutex<CancellationToken>,
    start_task: Mutex<Option<JoinHandle<()>>>,
}

/// Locks a std mutex, recovering the data if a holder panicked.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<E: Engine> BrokerSupervisor<E> {
    /// Starts building a supervisor around an engine factory.
    ///
    /// The factory runs once, at `init` time; its failure is the only way
    /// `init` can fail.
    pub fn builder<F>(cfg: Config, factory: F) -> super::BrokerSupervisorBuilder<E>
    where
        F: Fn() -> Result<E, EngineError> + Send + Sync + 'static,
    {
        super::BrokerSupervisorBuilder::new(cfg, Arc::new(factory))
    }

    pub(crate) fn new_internal(
        cfg: Config,
        factory: EngineFactory<E>,
        catalog: Arc<dyn ResourceCatalog>,
        bus: Bus,
        subs: Arc<SubscriberSet>,
    ) -> Self {
        Self {
            cfg,
            factory,
            catalog,
            bus,
            _subs: subs,
            state: Arc::new(StateCell::new()),
            engine: Mutex::new(None),
            bag: Mutex::new(ConfigBag::new()),
            runtime: Mutex::new(None),
            lifecycle: Arc::new(AsyncMutex::new(())),
            start_token: Mutex::new(CancellationToken::new()),
            start_task: Mutex::new(None),
        }
    }

    /// Constructs the (not-yet-started) engine handle and stores the bag.
    ///
    /// Fails only if engine construction itself fails. The handle is created
    /// exactly once per supervisor instance and never replaced.
    pub fn init(&self, bag: ConfigBag) -> Result<(), SupervisorError> {
        let engine = (self.factory)()?;
        *lock(&self.engine) = Some(Arc::new(engine));
        *lock(&self.bag) = bag;
        self.state.store(LifecycleState::Initialized);
        debug!("broker engine constructed");
        Ok(())
    }

    /// Names the tokio runtime the background start task runs on.
    ///
    /// Optional; must be called before `start` to take effect. If omitted,
    /// the ambient runtime of the thread calling `start` is captured
    /// instead. Set at most once; later calls are ignored with a warning.
    pub fn set_runtime(&self, handle: Handle) {
        let mut slot = lock(&self.runtime);
        if slot.is_some() {
            warn!("runtime handle already set, ignoring");
            return;
        }
        *slot = Some(handle);
    }

    /// Kicks off the broker start sequence and returns immediately.
    ///
    /// The actual work — resolve the configuration source, build the broker
    /// configuration, apply it, start the engine, wait for cluster
    /// formation — runs on a spawned task owned by this supervisor. Any
    /// failure there is logged, published as [`EventKind::StartupFailed`],
    /// and moves the state to [`LifecycleState::Failed`]; it is never
    /// propagated back here, so host boot is never blocked or aborted by
    /// broker startup problems.
    pub fn start(&self) {
        let Some(engine) = self.engine_handle() else {
            error!("start invoked before init");
            self.state.store(LifecycleState::Failed);
            self.bus.publish(
                Event::new(EventKind::StartupFailed).with_reason("start invoked before init"),
            );
            return;
        };

        let handle = lock(&self.runtime)
            .clone()
            .or_else(|| Handle::try_current().ok());
        let Some(handle) = handle else {
            error!("no tokio runtime available to run the broker start sequence");
            self.state.store(LifecycleState::Failed);
            self.bus.publish(
                Event::new(EventKind::StartupFailed).with_reason("no tokio runtime available"),
            );
            return;
        };

        self.state.store(LifecycleState::Starting);
        self.bus.publish(Event::new(EventKind::BrokerStarting));

        let token = CancellationToken::new();
        *lock(&self.start_token) = token.clone();

        let cfg = self.cfg.clone();
        let bag = lock(&self.bag).clone();
        let catalog = Arc::clone(&self.catalog);
        let bus = self.bus.clone();
        let state = Arc::clone(&self.state);
        let lifecycle = Arc::clone(&self.lifecycle);

        let task = handle.spawn(async move {
            let _guard = lifecycle.lock().await;
            if token.is_cancelled() {
                debug!("start voided before configuration was applied");
                state.store(LifecycleState::Stopped);
                return;
            }
            run_start_sequence(engine, cfg, bag, catalog, bus, state).await;
        });
        *lock(&self.start_task) = Some(task);
    }

    /// Waits until the engine reports active, polling at the configured
    /// interval, or fails with [`SupervisorError::ReadinessTimeout`] once the
    /// cumulative wait exceeds `timeout`.
    ///
    /// Before `init` the active predicate is constantly false, so this
    /// degenerates to a timeout. Readiness detection latency is bounded by
    /// the poll interval (up to one extra interval of delay).
    pub async fn wait_for_start(&self, timeout: Duration) -> Result<(), SupervisorError> {
        let mut waited = Duration::ZERO;
        while !self.broker_active() {
            if waited >= timeout {
                return Err(SupervisorError::ReadinessTimeout { timeout });
            }
            tokio::time::sleep(self.cfg.poll_interval).await;
            waited += self.cfg.poll_interval;
        }
        Ok(())
    }

    /// Stops the engine. Never raises.
    ///
    /// Voids a start attempt that has not yet begun, then waits for any
    /// in-flight start sequence to reach its terminal outcome before
    /// stopping the engine. Faults during engine stop are suppressed:
    /// logged, published as [`EventKind::StopFaultIgnored`], and otherwise
    /// dropped, so shutdown-time teardown is never blocked. Safe to call
    /// repeatedly and before `start` or `init`.
    pub async fn stop(&self) {
        lock(&self.start_token).cancel();
        let engine = self.engine_handle();

        let _guard = self.lifecycle.lock().await;
        if let Some(engine) = engine {
            match engine.stop().await {
                Ok(()) => self.bus.publish(Event::new(EventKind::BrokerStopped)),
                Err(e) => {
                    warn!(error = %e, label = e.as_label(), "ignoring fault while stopping the broker");
                    self.bus
                        .publish(Event::new(EventKind::StopFaultIgnored).with_reason(e.to_string()));
                }
            }
        }
        self.state.store(LifecycleState::Stopped);
        debug!("broker supervisor stopped");
    }

    /// Releases the engine handle and any straggling start task. No-throw.
    pub async fn destroy(&self) {
        lock(&self.start_token).cancel();
        if let Some(task) = lock(&self.start_task).take() {
            task.abort();
        }
        {
            let _guard = self.lifecycle.lock().await;
            *lock(&self.engine) = None;
        }
        self.state.store(LifecycleState::Destroyed);
        self.bus.publish(Event::new(EventKind::BrokerDestroyed));
        debug!("broker supervisor destroyed");
    }

    /// Returns the broker's human-readable identity string.
    ///
    /// Fails with [`SupervisorError::NotInitialized`] before `init`, or
    /// surfaces the engine's identity fault.
    pub fn describe(&self) -> Result<String, SupervisorError> {
        match self.engine_handle() {
            Some(engine) => Ok(engine.describe()?),
            None => Err(SupervisorError::NotInitialized),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state.load()
    }

    /// A receiver observing subsequent lifecycle events.
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The readiness predicate behind `wait_for_start`.
    fn broker_active(&self) -> bool {
        lock(&self.engine)
            .as_ref()
            .map(|engine| engine.is_active())
            .unwrap_or(false)
    }

    fn engine_handle(&self) -> Option<Arc<E>> {
        lock(&self.engine).as_ref().map(Arc::clone)
    }
}

/// The background start sequence: resolve, configure, start, wait for the
/// cluster. Runs under the lifecycle mutex; its only outputs are the state
/// cell, the log and the event bus.
async fn run_start_sequence<E: Engine>(
    engine: Arc<E>,
    cfg: Config,
    bag: ConfigBag,
    catalog: Arc<dyn ResourceCatalog>,
    bus: Bus,
    state: Arc<StateCell>,
) {
    debug!("creating embedded broker");

    let resolution = resolve(&bag, catalog.as_ref());
    match &resolution {
        Resolution::Explicit(name) | Resolution::Default(name) => {
            bus.publish(Event::new(EventKind::ConfigResolved).with_resource(name.as_str()));
        }
        Resolution::None => {
            let ev = match bag.config_resource() {
                Some(requested) => Event::new(EventKind::ConfigFallback)
                    .with_resource(requested)
                    .with_reason("configured resource not discoverable"),
                None => Event::new(EventKind::ConfigFallback)
                    .with_reason("no default resource discoverable"),
            };
            bus.publish(ev);
        }
    }

    let outcome = async {
        match broker_config(resolution) {
            BrokerConfig::Resource(name) => engine.apply_resource(&name).await?,
            BrokerConfig::Settings(settings) => {
                info!("creating minimal broker, security disabled");
                engine.apply_settings(settings).await?;
            }
        }
        engine.start().await?;
        engine
            .wait_cluster_forming(cfg.cluster.timeout, cfg.cluster.expected, cfg.cluster.min_live)
            .await?;
        Ok::<(), EngineError>(())
    }
    .await;

    match outcome {
        Ok(()) => {
            state.store(LifecycleState::Running);
            bus.publish(Event::new(EventKind::BrokerActive));
            debug!("embedded broker now running");
        }
        Err(e) => {
            error!(error = %e, label = e.as_label(), "could not start the embedded broker");
            state.store(LifecycleState::Failed);
            bus.publish(Event::new(EventKind::StartupFailed).with_reason(e.to_string()));
        }
    }
}
