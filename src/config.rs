//! # Host-supplied settings and supervisor runtime configuration.
//!
//! Two concerns live here:
//!
//! 1. [`ConfigBag`] — the arbitrary key/value properties the host framework
//!    hands to `init`. Read-only after init; the only recognized key is
//!    [`CONFIG_RESOURCE_KEY`].
//! 2. [`Config`] — runtime settings for the supervisor itself: readiness
//!    poll interval, cluster-formation policy, event-bus capacity.
//!
//! ## Policy constants
//! The defaults of [`Config`] encode the fixed policy of the original
//! design: poll every **100 ms**, wait up to **1 minute** for a cluster of
//! **3** expected members with a minimum of **1** live member. The fields
//! are public so tests can shrink the budgets; production callers are
//! expected to keep the defaults.

use std::collections::HashMap;
use std::time::Duration;

/// Property key naming the broker configuration resource to use.
pub const CONFIG_RESOURCE_KEY: &str = "activemq.config.filename";

/// Resource name probed when the bag carries no explicit configuration.
pub const DEFAULT_CONFIG_RESOURCE: &str = "broker.xml";

/// Key/value settings supplied by the host at `init`.
///
/// Immutable once handed to the supervisor; discarded at `destroy`.
/// Unrecognized keys are carried but ignored.
#[derive(Clone, Debug, Default)]
pub struct ConfigBag {
    entries: HashMap<String, String>,
}

impl ConfigBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the configured broker resource name, if any.
    ///
    /// Shorthand for `get(CONFIG_RESOURCE_KEY)`.
    pub fn config_resource(&self) -> Option<&str> {
        self.get(CONFIG_RESOURCE_KEY)
    }

    /// Inserts a key/value pair, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// True if the bag carries no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for ConfigBag {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, String)> for ConfigBag {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Bound applied to the engine's internal cluster-formation step before the
/// broker counts as started.
#[derive(Clone, Copy, Debug)]
pub struct ClusterFormation {
    /// Maximum time to wait for the cluster to form.
    pub timeout: Duration,
    /// Expected cluster size.
    pub expected: u32,
    /// Minimum live members required.
    pub min_live: u32,
}

impl Default for ClusterFormation {
    /// The fixed policy of the original design: 1 minute, 3 expected, 1 live.
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            expected: 3,
            min_live: 1,
        }
    }
}

/// Runtime configuration for the supervisor.
///
/// ## Field semantics
/// - `poll_interval`: granularity of the `wait_for_start` busy-wait; also
///   bounds readiness detection latency (up to one extra interval).
/// - `cluster`: bound for the engine's cluster-formation wait during the
///   background start sequence.
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the Bus).
#[derive(Clone, Debug)]
pub struct Config {
    /// Interval between readiness probes in `wait_for_start`.
    pub poll_interval: Duration,

    /// Cluster-formation wait policy applied during startup.
    pub cluster: ClusterFormation,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `poll_interval = 100ms`
    /// - `cluster = ClusterFormation::default()` (60s / 3 expected / 1 live)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            cluster: ClusterFormation::default(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_reads_back_recognized_key() {
        let mut bag = ConfigBag::new();
        assert!(bag.config_resource().is_none());

        bag.set(CONFIG_RESOURCE_KEY, "custom-broker.xml");
        assert_eq!(bag.config_resource(), Some("custom-broker.xml"));
        assert_eq!(bag.get("missing"), None);
    }

    #[test]
    fn defaults_match_fixed_policy() {
        let cfg = Config::default();
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
        assert_eq!(cfg.cluster.timeout, Duration::from_secs(60));
        assert_eq!(cfg.cluster.expected, 3);
        assert_eq!(cfg.cluster.min_live, 1);
    }
}
