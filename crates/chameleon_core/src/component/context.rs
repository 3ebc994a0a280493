//! Explicit context handed to lifecycle hooks.

use crate::component::instance::Component;
use crate::config::RuntimeConfig;
use crate::error::LoaderResult;
use crate::extension::point::Extension;
use crate::runtime::Registry;
use std::sync::Arc;

/// View of the frozen registry from inside one component's hook.
#[derive(Debug, Clone, Copy)]
pub struct ComponentContext<'a> {
    registry: &'a Registry,
    component: &'a Arc<Component>,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(registry: &'a Registry, component: &'a Arc<Component>) -> Self {
        Self {
            registry,
            component,
        }
    }

    /// The component whose hook is running.
    pub fn component(&self) -> &'a Arc<Component> {
        self.component
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn get_component(&self, identifier: &str) -> LoaderResult<Arc<Component>> {
        self.registry.get_component(identifier)
    }

    pub fn find_component(&self, identifier: &str) -> Option<&'a Arc<Component>> {
        self.registry.find_component(identifier)
    }

    pub fn extensions(&self, namespace: &str) -> &'a [Extension] {
        self.registry.query(namespace)
    }

    pub fn config(&self) -> &'a RuntimeConfig {
        self.registry.config()
    }

    pub fn property(&self, key: &str) -> Option<&'a str> {
        self.registry.config().property(key)
    }
}
