//! # Configuration resolution: which broker config source applies.
//!
//! Decides, fresh on every start attempt, whether the broker is configured
//! from an explicitly named resource, the default resource, or not at all.
//!
//! ## Rules
//! - bag names a resource AND the catalog can locate it → [`Resolution::Explicit`]
//! - bag names a resource the catalog cannot locate → [`Resolution::None`]
//!   (logged as a warning; absence is a reportable outcome, not a fault)
//! - bag has no value → probe [`DEFAULT_CONFIG_RESOURCE`]; found →
//!   [`Resolution::Default`], otherwise [`Resolution::None`]
//!
//! Resolution itself never fails. A `None` outcome later degrades to the
//! minimal zero-config broker, prioritizing availability over strict
//! configuration fidelity.
//!
//! Discoverability is abstracted behind [`ResourceCatalog`] so the resolver
//! stays independent of where configuration actually lives; [`DirCatalog`]
//! is the filesystem-backed implementation.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{ConfigBag, DEFAULT_CONFIG_RESOURCE};

/// Which configuration source (if any) applies to the next start attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The bag named a resource and it is discoverable.
    Explicit(String),
    /// No resource was named; the default resource is discoverable.
    Default(String),
    /// No discoverable resource; the broker gets the minimal configuration.
    None,
}

impl Resolution {
    /// Returns the resolved resource name, if one applies.
    pub fn resource(&self) -> Option<&str> {
        match self {
            Resolution::Explicit(name) | Resolution::Default(name) => Some(name),
            Resolution::None => None,
        }
    }
}

/// Lookup of named configuration resources.
///
/// The supervisor only ever asks whether a name is discoverable; parsing the
/// resource is the broker engine's job.
pub trait ResourceCatalog: Send + Sync + 'static {
    /// Returns the location of `name`, or `None` if it is not discoverable.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Filesystem-backed catalog searching a fixed list of root directories.
///
/// The first root containing a regular file named `name` wins. Relative
/// names containing separators are joined onto each root as-is.
#[derive(Clone, Debug)]
pub struct DirCatalog {
    roots: Vec<PathBuf>,
}

impl DirCatalog {
    /// Creates a catalog over the given root directories.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for DirCatalog {
    /// Searches the process working directory only.
    fn default() -> Self {
        Self::new([Path::new(".")])
    }
}

impl ResourceCatalog for DirCatalog {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(name))
            .find(|candidate| candidate.is_file())
    }
}

/// Resolves the configuration source for one start attempt.
///
/// Never fails; a missing resource is reported via a warning and degrades
/// to [`Resolution::None`].
pub fn resolve(bag: &ConfigBag, catalog: &dyn ResourceCatalog) -> Resolution {
    if let Some(requested) = bag.config_resource() {
        if catalog.locate(requested).is_some() {
            info!(resource = requested, "found broker configuration resource");
            return Resolution::Explicit(requested.to_string());
        }
        warn!(
            resource = requested,
            "configured broker resource not discoverable, falling back to minimal configuration"
        );
        return Resolution::None;
    }

    if catalog.locate(DEFAULT_CONFIG_RESOURCE).is_some() {
        info!(
            resource = DEFAULT_CONFIG_RESOURCE,
            "found default broker configuration resource"
        );
        return Resolution::Default(DEFAULT_CONFIG_RESOURCE.to_string());
    }
    warn!(
        resource = DEFAULT_CONFIG_RESOURCE,
        "default broker resource not discoverable, starting with minimal configuration"
    );
    Resolution::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_RESOURCE_KEY;
    use std::collections::HashSet;

    /// Catalog over a fixed set of names, no filesystem involved.
    struct StaticCatalog(HashSet<&'static str>);

    impl StaticCatalog {
        fn with(names: &[&'static str]) -> Self {
            Self(names.iter().copied().collect())
        }
    }

    impl ResourceCatalog for StaticCatalog {
        fn locate(&self, name: &str) -> Option<PathBuf> {
            self.0.contains(name).then(|| PathBuf::from(name))
        }
    }

    fn bag_with(resource: &str) -> ConfigBag {
        let mut bag = ConfigBag::new();
        bag.set(CONFIG_RESOURCE_KEY, resource);
        bag
    }

    #[test]
    fn explicit_resource_wins_when_discoverable() {
        let catalog = StaticCatalog::with(&["custom.xml", "broker.xml"]);
        let outcome = resolve(&bag_with("custom.xml"), &catalog);
        assert_eq!(outcome, Resolution::Explicit("custom.xml".into()));
        assert_eq!(outcome.resource(), Some("custom.xml"));
    }

    #[test]
    fn missing_explicit_resource_degrades_to_none() {
        // An unreachable explicit resource must not fall through to the
        // default resource, even if that one exists.
        let catalog = StaticCatalog::with(&["broker.xml"]);
        let outcome = resolve(&bag_with("custom.xml"), &catalog);
        assert_eq!(outcome, Resolution::None);
    }

    #[test]
    fn empty_bag_probes_default_resource() {
        let catalog = StaticCatalog::with(&["broker.xml"]);
        let outcome = resolve(&ConfigBag::new(), &catalog);
        assert_eq!(outcome, Resolution::Default("broker.xml".into()));
    }

    #[test]
    fn nothing_discoverable_resolves_to_none() {
        let catalog = StaticCatalog::with(&[]);
        let outcome = resolve(&ConfigBag::new(), &catalog);
        assert_eq!(outcome, Resolution::None);
        assert_eq!(outcome.resource(), None);
    }

    #[test]
    fn dir_catalog_finds_files_under_roots() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broker.xml"), "<configuration/>").expect("write");

        let catalog = DirCatalog::new([dir.path()]);
        assert!(catalog.locate("broker.xml").is_some());
        assert!(catalog.locate("absent.xml").is_none());
    }
}
