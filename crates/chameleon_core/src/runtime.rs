//! Frozen registry shared after startup.
//!
//! # Responsibility
//! - Hold every loaded component, extension point and bundle once resolution
//!   has finished.
//! - Serve lookups from any thread without locking.
//!
//! # Invariants
//! - Nothing is added or removed after `ComponentResolver::finish`.
//! - Components iterate in load order, which is a valid topological order of
//!   the requirement graph.

use crate::bundle::Bundle;
use crate::component::instance::Component;
use crate::config::RuntimeConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::extension::point::{Extension, ExtensionPoint};
use crate::extension::registry::ExtensionRegistry;
use indexmap::IndexMap;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug)]
pub struct Registry {
    components: IndexMap<String, Arc<Component>>,
    extensions: ExtensionRegistry,
    bundles: IndexMap<String, Bundle>,
    failures: Vec<LoaderError>,
    config: Arc<RuntimeConfig>,
}

impl Registry {
    pub(crate) fn new(
        components: IndexMap<String, Arc<Component>>,
        extensions: ExtensionRegistry,
        bundles: IndexMap<String, Bundle>,
        failures: Vec<LoaderError>,
        config: Arc<RuntimeConfig>,
    ) -> Self {
        Self {
            components,
            extensions,
            bundles,
            failures,
            config,
        }
    }

    /// Loaded component for `identifier`.
    ///
    /// # Errors
    /// - `ComponentNotFound` when the identifier is absent, disabled or failed.
    pub fn get_component(&self, identifier: &str) -> LoaderResult<Arc<Component>> {
        self.find_component(identifier)
            .cloned()
            .ok_or_else(|| LoaderError::ComponentNotFound(identifier.trim().to_string()))
    }

    pub fn find_component(&self, identifier: &str) -> Option<&Arc<Component>> {
        self.components.get(identifier.trim())
    }

    /// Loaded components in load order.
    pub fn components(&self) -> impl Iterator<Item = &Arc<Component>> {
        self.components.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Extensions contributed to `namespace`; empty when nothing declared it.
    pub fn query(&self, namespace: &str) -> &[Extension] {
        self.extensions.query(namespace)
    }

    pub fn extension_point(&self, namespace: &str) -> Option<&ExtensionPoint> {
        self.extensions.extension_point(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.extensions.namespaces()
    }

    pub fn bundle(&self, identifier: &str) -> Option<&Bundle> {
        self.bundles.get(identifier)
    }

    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.values()
    }

    /// Top-level resolution failures recorded under lenient resolution.
    pub fn failures(&self) -> &[LoaderError] {
        &self.failures
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Cheap, cloneable, thread-safe handle to a frozen [`Registry`].
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    inner: Arc<Registry>,
}

impl RegistryHandle {
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(registry),
        }
    }
}

impl Deref for RegistryHandle {
    type Target = Registry;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
