//! Named target factories.
//!
//! A `FactoryRegistry` maps names to targets. Entry points resolve the
//! target they build by name, so installing a composed target under a base
//! target's name makes every later lookup of that name yield the composed
//! system. Each name may be rebound at most once, and the rebinding must
//! happen before the lookup it is meant to affect.
//!
//! A process-wide registry, seeded with the built-in targets, backs
//! [`install_as_default_factory`] and [`resolve_default`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::base::{Target, Ulx3sTarget};
use crate::error::{Result, SocError};

/// Name-to-target bindings.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: BTreeMap<String, Arc<dyn Target>>,
    installed: BTreeSet<String>,
}

impl FactoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in targets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Ulx3sTarget));
        registry
    }

    /// Bind a target under its own name, replacing any earlier registration.
    pub fn register(&mut self, factory: Arc<dyn Target>) {
        self.factories.insert(factory.name().to_string(), factory);
    }

    /// Bind `name` to `factory`, returning the binding it replaces.
    ///
    /// A name can be installed over once; a second install under the same
    /// name fails with `FactoryAlreadyInstalled` and leaves the first in place.
    pub fn install(
        &mut self,
        name: &str,
        factory: Arc<dyn Target>,
    ) -> Result<Option<Arc<dyn Target>>> {
        if self.installed.contains(name) {
            return Err(SocError::FactoryAlreadyInstalled {
                name: name.to_string(),
            });
        }
        let previous = self.factories.insert(name.to_string(), factory);
        self.installed.insert(name.to_string());
        match &previous {
            Some(old) => tracing::warn!(name, replaced = old.description(), "rebound factory"),
            None => tracing::info!(name, "installed factory"),
        }
        Ok(previous)
    }

    /// The target bound to `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Target>> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| SocError::UnknownFactory {
                name: name.to_string(),
            })
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Whether `name` has been installed over.
    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains(name)
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("installed", &self.installed)
            .finish()
    }
}

fn default_registry() -> &'static RwLock<FactoryRegistry> {
    static REGISTRY: OnceLock<RwLock<FactoryRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(FactoryRegistry::with_builtins()))
}

/// Replace `base` in the process-wide registry with `composed`.
///
/// Must run before any [`resolve_default`] of the base name that is meant to
/// see the composed target.
pub fn install_as_default_factory(base: &dyn Target, composed: Arc<dyn Target>) -> Result<()> {
    let mut registry = default_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    registry.install(base.name(), composed)?;
    Ok(())
}

/// Look up a target in the process-wide registry.
pub fn resolve_default(name: &str) -> Result<Arc<dyn Target>> {
    default_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(name)
}

/// Names bound in the process-wide registry, sorted.
pub fn default_names() -> Vec<String> {
    default_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .names()
}
