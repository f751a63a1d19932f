//! Integration tests for the broker lifecycle supervisor, driven through a
//! scripted fake engine.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::TryRecvError;

use brokervisor::{
    BrokerSettings, BrokerSupervisor, Config, ConfigBag, Engine, EngineError, Event, EventKind,
    LifecycleState, LogWriter, ResourceCatalog, Subscribe, SupervisorError, CONFIG_RESOURCE_KEY,
};

/// What the supervisor handed to the engine before starting it.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Applied {
    Resource(String),
    Settings(BrokerSettings),
}

/// Scripted behavior for one fake engine.
#[derive(Clone, Default)]
struct Script {
    fail_start: Option<&'static str>,
    fail_stop: Option<&'static str>,
    fail_cluster: bool,
    fail_identity: Option<&'static str>,
}

/// Observed engine interactions, shared between the test and the engine the
/// supervisor's factory creates.
#[derive(Default)]
struct Recorder {
    active: AtomicBool,
    applied: Mutex<Vec<Applied>>,
    stop_calls: AtomicU32,
}

struct FakeEngine {
    rec: Arc<Recorder>,
    script: Script,
}

#[async_trait]
impl Engine for FakeEngine {
    async fn apply_resource(&self, resource: &str) -> Result<(), EngineError> {
        self.rec
            .applied
            .lock()
            .unwrap()
            .push(Applied::Resource(resource.to_string()));
        Ok(())
    }

    async fn apply_settings(&self, settings: BrokerSettings) -> Result<(), EngineError> {
        self.rec
            .applied
            .lock()
            .unwrap()
            .push(Applied::Settings(settings));
        Ok(())
    }

    async fn start(&self) -> Result<(), EngineError> {
        if let Some(reason) = self.script.fail_start {
            return Err(EngineError::Start {
                reason: reason.to_string(),
            });
        }
        self.rec.active.store(true, Ordering::Release);
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.rec.stop_calls.fetch_add(1, Ordering::AcqRel);
        if let Some(reason) = self.script.fail_stop {
            return Err(EngineError::Stop {
                reason: reason.to_string(),
            });
        }
        self.rec.active.store(false, Ordering::Release);
        Ok(())
    }

    async fn wait_cluster_forming(
        &self,
        timeout: Duration,
        expected: u32,
        min_live: u32,
    ) -> Result<(), EngineError> {
        if self.script.fail_cluster {
            self.rec.active.store(false, Ordering::Release);
            return Err(EngineError::ClusterTimeout {
                timeout,
                expected,
                min_live,
            });
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.rec.active.load(Ordering::Acquire)
    }

    fn describe(&self) -> Result<String, EngineError> {
        match self.script.fail_identity {
            Some(reason) => Err(EngineError::Identity {
                reason: reason.to_string(),
            }),
            None => Ok("embedded-broker".to_string()),
        }
    }
}

/// Catalog over a fixed set of names, no filesystem involved.
struct StaticCatalog(HashSet<&'static str>);

impl StaticCatalog {
    fn with(names: &[&'static str]) -> Arc<Self> {
        Arc::new(Self(names.iter().copied().collect()))
    }
}

impl ResourceCatalog for StaticCatalog {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.0.contains(name).then(|| PathBuf::from(name))
    }
}

fn supervisor_with(
    script: Script,
    catalog: Arc<dyn ResourceCatalog>,
) -> (BrokerSupervisor<FakeEngine>, Arc<Recorder>) {
    let rec = Arc::new(Recorder::default());
    let factory_rec = Arc::clone(&rec);
    let sup = BrokerSupervisor::builder(Config::default(), move || {
        Ok(FakeEngine {
            rec: Arc::clone(&factory_rec),
            script: script.clone(),
        })
    })
    .with_catalog(catalog)
    .with_subscribers(vec![Arc::new(LogWriter) as Arc<dyn Subscribe>])
    .build();
    (sup, rec)
}

fn bag_with(resource: &str) -> ConfigBag {
    let mut bag = ConfigBag::new();
    bag.set(CONFIG_RESOURCE_KEY, resource);
    bag
}

/// Drains every event currently buffered on the receiver.
fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(ev) => events.push(ev),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}

fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}

#[tokio::test(start_paused = true)]
async fn wait_for_start_before_init_times_out() {
    let (sup, _rec) = supervisor_with(Script::default(), StaticCatalog::with(&[]));

    let budget = Duration::from_millis(50);
    let before = tokio::time::Instant::now();
    let err = sup.wait_for_start(budget).await.unwrap_err();

    assert!(matches!(
        err,
        SupervisorError::ReadinessTimeout { timeout } if timeout == budget
    ));
    // ± one poll interval around the budget.
    let elapsed = before.elapsed();
    assert!(elapsed >= budget && elapsed <= budget + Duration::from_millis(100));
    assert_eq!(sup.state(), LifecycleState::Uninitialized);
}

#[tokio::test(start_paused = true)]
async fn wait_for_start_before_start_times_out() {
    let (sup, _rec) = supervisor_with(Script::default(), StaticCatalog::with(&[]));
    sup.init(ConfigBag::new()).unwrap();

    let err = sup
        .wait_for_start(Duration::from_millis(50))
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "readiness_timeout");
}

#[tokio::test(start_paused = true)]
async fn full_lifecycle_with_minimal_configuration() {
    let (sup, rec) = supervisor_with(Script::default(), StaticCatalog::with(&[]));
    let mut rx = sup.events();

    sup.init(ConfigBag::new()).unwrap();
    sup.set_runtime(tokio::runtime::Handle::current());
    sup.start();

    sup.wait_for_start(Duration::from_secs(60)).await.unwrap();
    assert_eq!(sup.state(), LifecycleState::Running);
    assert_eq!(sup.describe().unwrap(), "embedded-broker");

    // Nothing discoverable, so the engine got the minimal configuration.
    let applied = rec.applied.lock().unwrap().clone();
    assert_eq!(applied, vec![Applied::Settings(BrokerSettings::minimal())]);

    sup.stop().await;
    assert_eq!(sup.state(), LifecycleState::Stopped);
    assert_eq!(rec.stop_calls.load(Ordering::Acquire), 1);

    sup.destroy().await;
    assert_eq!(sup.state(), LifecycleState::Destroyed);
    assert!(matches!(
        sup.describe(),
        Err(SupervisorError::NotInitialized)
    ));

    let seen = kinds(&drain(&mut rx));
    let expect = [
        EventKind::BrokerStarting,
        EventKind::ConfigFallback,
        EventKind::BrokerActive,
        EventKind::BrokerStopped,
        EventKind::BrokerDestroyed,
    ];
    assert_eq!(seen, expect);
}

#[tokio::test(start_paused = true)]
async fn explicit_resource_is_used_when_discoverable() {
    let (sup, rec) = supervisor_with(Script::default(), StaticCatalog::with(&["custom.xml"]));
    let mut rx = sup.events();

    sup.init(bag_with("custom.xml")).unwrap();
    sup.start();
    sup.wait_for_start(Duration::from_secs(60)).await.unwrap();

    let applied = rec.applied.lock().unwrap().clone();
    assert_eq!(applied, vec![Applied::Resource("custom.xml".to_string())]);

    let events = drain(&mut rx);
    let resolved = events
        .iter()
        .find(|e| e.kind == EventKind::ConfigResolved)
        .expect("resolution event");
    assert_eq!(resolved.resource.as_deref(), Some("custom.xml"));
}

#[tokio::test(start_paused = true)]
async fn default_resource_is_used_when_bag_is_empty() {
    let (sup, rec) = supervisor_with(Script::default(), StaticCatalog::with(&["broker.xml"]));

    sup.init(ConfigBag::new()).unwrap();
    sup.start();
    sup.wait_for_start(Duration::from_secs(60)).await.unwrap();

    let applied = rec.applied.lock().unwrap().clone();
    assert_eq!(applied, vec![Applied::Resource("broker.xml".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn missing_resource_falls_back_to_minimal_configuration() {
    // The default resource exists but must not be probed when the bag names
    // an explicit (missing) one.
    let (sup, rec) = supervisor_with(Script::default(), StaticCatalog::with(&["broker.xml"]));
    let mut rx = sup.events();

    sup.init(bag_with("missing.xml")).unwrap();
    sup.start();
    sup.wait_for_start(Duration::from_secs(60)).await.unwrap();

    let applied = rec.applied.lock().unwrap().clone();
    assert_eq!(applied, vec![Applied::Settings(BrokerSettings::minimal())]);

    let events = drain(&mut rx);
    let fallback = events
        .iter()
        .find(|e| e.kind == EventKind::ConfigFallback)
        .expect("fallback event");
    assert_eq!(fallback.resource.as_deref(), Some("missing.xml"));
}

#[tokio::test(start_paused = true)]
async fn startup_failure_is_contained() {
    let script = Script {
        fail_start: Some("listener refused to bind"),
        ..Script::default()
    };
    let (sup, _rec) = supervisor_with(script, StaticCatalog::with(&[]));
    let mut rx = sup.events();

    sup.init(ConfigBag::new()).unwrap();
    sup.start(); // must not raise, ever

    let err = sup.wait_for_start(Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err.as_label(), "readiness_timeout");
    assert_eq!(sup.state(), LifecycleState::Failed);

    let events = drain(&mut rx);
    let failed = events
        .iter()
        .find(|e| e.kind == EventKind::StartupFailed)
        .expect("startup failure event");
    assert!(failed
        .reason
        .as_deref()
        .unwrap()
        .contains("listener refused to bind"));
}

#[tokio::test(start_paused = true)]
async fn cluster_formation_timeout_is_contained() {
    let script = Script {
        fail_cluster: true,
        ..Script::default()
    };
    let (sup, _rec) = supervisor_with(script, StaticCatalog::with(&[]));
    let mut rx = sup.events();

    sup.init(ConfigBag::new()).unwrap();
    sup.start();

    let _ = sup.wait_for_start(Duration::from_secs(1)).await;
    assert_eq!(sup.state(), LifecycleState::Failed);

    let events = drain(&mut rx);
    let failed = events
        .iter()
        .find(|e| e.kind == EventKind::StartupFailed)
        .expect("startup failure event");
    assert!(failed.reason.as_deref().unwrap().contains("cluster"));
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_safe_without_start() {
    let (sup, rec) = supervisor_with(Script::default(), StaticCatalog::with(&[]));

    // Before init: nothing to stop, still no error.
    sup.stop().await;
    assert_eq!(sup.state(), LifecycleState::Stopped);
    assert_eq!(rec.stop_calls.load(Ordering::Acquire), 0);

    sup.init(ConfigBag::new()).unwrap();
    sup.stop().await;
    sup.stop().await;
    assert_eq!(rec.stop_calls.load(Ordering::Acquire), 2);
    assert_eq!(sup.state(), LifecycleState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn stop_swallows_engine_faults() {
    let script = Script {
        fail_stop: Some("wedged journal"),
        ..Script::default()
    };
    let (sup, rec) = supervisor_with(script, StaticCatalog::with(&[]));
    let mut rx = sup.events();

    sup.init(ConfigBag::new()).unwrap();
    sup.start();
    sup.wait_for_start(Duration::from_secs(60)).await.unwrap();

    sup.stop().await; // the engine fault must not escape
    assert_eq!(sup.state(), LifecycleState::Stopped);
    assert_eq!(rec.stop_calls.load(Ordering::Acquire), 1);

    let events = drain(&mut rx);
    let ignored = events
        .iter()
        .find(|e| e.kind == EventKind::StopFaultIgnored)
        .expect("suppressed stop fault event");
    assert!(ignored.reason.as_deref().unwrap().contains("wedged journal"));
}

#[tokio::test(start_paused = true)]
async fn identity_fault_surfaces_only_on_describe() {
    let script = Script {
        fail_identity: Some("name not representable"),
        ..Script::default()
    };
    let (sup, _rec) = supervisor_with(script, StaticCatalog::with(&[]));

    sup.init(ConfigBag::new()).unwrap();
    let err = sup.describe().unwrap_err();
    assert!(matches!(
        err,
        SupervisorError::Engine(EngineError::Identity { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn second_start_after_stop_is_permitted() {
    let (sup, rec) = supervisor_with(Script::default(), StaticCatalog::with(&[]));

    sup.init(ConfigBag::new()).unwrap();
    sup.start();
    sup.wait_for_start(Duration::from_secs(60)).await.unwrap();
    sup.stop().await;
    assert_eq!(sup.state(), LifecycleState::Stopped);

    sup.start();
    sup.wait_for_start(Duration::from_secs(60)).await.unwrap();
    assert_eq!(sup.state(), LifecycleState::Running);

    // Resolution is recomputed per attempt, so the minimal configuration
    // was applied once per start.
    let applied = rec.applied.lock().unwrap().clone();
    assert_eq!(applied.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_voids_a_start_that_has_not_begun() {
    let (sup, rec) = supervisor_with(Script::default(), StaticCatalog::with(&[]));

    sup.init(ConfigBag::new()).unwrap();
    sup.start();
    // No await between start and stop: the background task has not had a
    // chance to run, so the attempt is voided at the token check.
    sup.stop().await;

    assert_eq!(sup.state(), LifecycleState::Stopped);
    let err = sup
        .wait_for_start(Duration::from_millis(300))
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "readiness_timeout");
    assert!(rec.applied.lock().unwrap().is_empty());
}
