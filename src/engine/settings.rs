//! # Broker configuration values and the factory that produces them.
//!
//! [`broker_config`] turns a [`Resolution`] into the configuration actually
//! handed to the engine:
//!
//! ```text
//! Resolution::Explicit(name) ──► BrokerConfig::Resource(name)
//! Resolution::Default(name)  ──► BrokerConfig::Resource(name)
//! Resolution::None           ──► BrokerConfig::Settings(minimal)
//! ```
//!
//! The minimal configuration disables security and registers two acceptors
//! (in-process and loopback TCP), guaranteeing the broker is always
//! startable even with zero external configuration. That trades
//! production-readiness for availability-by-default.

use crate::resolve::Resolution;

/// In-process acceptor identifier of the minimal configuration.
pub const IN_VM_ACCEPTOR: &str = "in-vm";

/// In-process transport address of the minimal configuration.
pub const IN_VM_URL: &str = "vm://0";

/// TCP acceptor identifier of the minimal configuration.
pub const TCP_ACCEPTOR: &str = "tcp";

/// Loopback TCP address of the minimal configuration.
pub const TCP_URL: &str = "tcp://127.0.0.1:61616";

/// A named transport endpoint the broker accepts connections on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acceptor {
    /// Acceptor identifier.
    pub name: String,
    /// Transport address, e.g. `vm://0` or `tcp://127.0.0.1:61616`.
    pub url: String,
}

impl Acceptor {
    /// Creates an acceptor from a name and a transport address.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Programmatic broker configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerSettings {
    /// Whether the engine enforces security.
    pub security_enabled: bool,
    /// Acceptors registered before start.
    pub acceptors: Vec<Acceptor>,
}

impl BrokerSettings {
    /// The zero-config minimal broker: security disabled, in-process and
    /// loopback TCP acceptors.
    pub fn minimal() -> Self {
        Self {
            security_enabled: false,
            acceptors: vec![
                Acceptor::new(IN_VM_ACCEPTOR, IN_VM_URL),
                Acceptor::new(TCP_ACCEPTOR, TCP_URL),
            ],
        }
    }
}

/// The configuration applied to the engine for one start attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrokerConfig {
    /// A named configuration resource; the engine parses it itself.
    Resource(String),
    /// Programmatic settings, used when no resource is discoverable.
    Settings(BrokerSettings),
}

/// Builds the broker configuration for a resolution outcome.
pub fn broker_config(resolution: Resolution) -> BrokerConfig {
    match resolution {
        Resolution::Explicit(name) | Resolution::Default(name) => BrokerConfig::Resource(name),
        Resolution::None => BrokerConfig::Settings(BrokerSettings::minimal()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_settings_disable_security_and_register_both_acceptors() {
        let settings = BrokerSettings::minimal();
        assert!(!settings.security_enabled);
        assert_eq!(
            settings.acceptors,
            vec![
                Acceptor::new("in-vm", "vm://0"),
                Acceptor::new("tcp", "tcp://127.0.0.1:61616"),
            ]
        );
    }

    #[test]
    fn resolved_resources_map_to_resource_configs() {
        assert_eq!(
            broker_config(Resolution::Explicit("custom.xml".into())),
            BrokerConfig::Resource("custom.xml".into())
        );
        assert_eq!(
            broker_config(Resolution::Default("broker.xml".into())),
            BrokerConfig::Resource("broker.xml".into())
        );
    }

    #[test]
    fn unresolved_maps_to_minimal_settings() {
        assert_eq!(
            broker_config(Resolution::None),
            BrokerConfig::Settings(BrokerSettings::minimal())
        );
    }
}
