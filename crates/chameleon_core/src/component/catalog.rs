//! Typed implementation catalog.
//!
//! # Responsibility
//! - Map descriptor implementation names to component constructors.
//! - Map extension type tags to materializers.
//!
//! # Invariants
//! - Names are unique per kind; the empty component name and the empty and
//!   `standard` extension tags are reserved for the built-ins.
//! - Lookups never construct anything; they hand back shared factories.

use crate::component::behavior::{ComponentBehavior, DefaultBehavior};
use crate::component::instance::Implementation;
use crate::config::RuntimeConfig;
use crate::descriptor::manifest::STANDARD_EXTENSION_TYPE;
use crate::extension::point::{factory_for, ExtensionFactory, Materialize, StandardExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

/// Constructor input for one component implementation.
#[derive(Debug, Clone, Copy)]
pub struct ComponentInit<'a> {
    pub identifier: &'a str,
    pub version: &'a str,
    pub required_identifiers: &'a [String],
    /// Folder the descriptor was loaded from.
    pub path: &'a Path,
    pub config: &'a RuntimeConfig,
}

pub type ComponentFactory = Arc<dyn Fn(&ComponentInit<'_>) -> Implementation + Send + Sync>;

/// Registry of constructors that descriptors refer to by name.
#[derive(Clone)]
pub struct ImplementationCatalog {
    components: BTreeMap<String, ComponentFactory>,
    extension_types: BTreeMap<String, ExtensionFactory>,
}

impl Default for ImplementationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ImplementationCatalog {
    /// Creates a catalog holding only the built-in implementations.
    pub fn new() -> Self {
        let mut components: BTreeMap<String, ComponentFactory> = BTreeMap::new();
        components.insert(
            String::new(),
            Arc::new(|_: &ComponentInit<'_>| Implementation::new(DefaultBehavior)),
        );

        let mut extension_types = BTreeMap::new();
        extension_types.insert(String::new(), factory_for::<StandardExtension>());
        extension_types.insert(
            STANDARD_EXTENSION_TYPE.to_string(),
            factory_for::<StandardExtension>(),
        );

        Self {
            components,
            extension_types,
        }
    }

    /// Registers a component constructor under `name`.
    pub fn register_component<T, F>(&mut self, name: &str, factory: F) -> Result<(), CatalogError>
    where
        T: ComponentBehavior,
        F: Fn(&ComponentInit<'_>) -> T + Send + Sync + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::ReservedName(name.to_string()));
        }
        if self.components.contains_key(name) {
            return Err(CatalogError::DuplicateComponent(name.to_string()));
        }
        self.components.insert(
            name.to_string(),
            Arc::new(move |init: &ComponentInit<'_>| Implementation::new(factory(init))),
        );
        Ok(())
    }

    /// Registers materializer `T` under extension type `tag`.
    pub fn register_extension_type<T: Materialize>(&mut self, tag: &str) -> Result<(), CatalogError> {
        let tag = tag.trim();
        if tag.is_empty() || tag == STANDARD_EXTENSION_TYPE {
            return Err(CatalogError::ReservedName(tag.to_string()));
        }
        if self.extension_types.contains_key(tag) {
            return Err(CatalogError::DuplicateExtensionType(tag.to_string()));
        }
        self.extension_types
            .insert(tag.to_string(), factory_for::<T>());
        Ok(())
    }

    pub fn component_factory(&self, name: &str) -> Option<ComponentFactory> {
        self.components.get(name.trim()).cloned()
    }

    pub fn extension_factory(&self, tag: &str) -> Option<ExtensionFactory> {
        self.extension_types.get(tag.trim()).cloned()
    }

    /// Registered component names, built-ins excluded.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components
            .keys()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Registered extension type tags, built-ins excluded.
    pub fn extension_type_tags(&self) -> impl Iterator<Item = &str> {
        self.extension_types
            .keys()
            .map(String::as_str)
            .filter(|tag| !tag.is_empty() && *tag != STANDARD_EXTENSION_TYPE)
    }
}

/// Catalog registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    ReservedName(String),
    DuplicateComponent(String),
    DuplicateExtensionType(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedName(value) => write!(f, "implementation name is reserved: `{value}`"),
            Self::DuplicateComponent(value) => {
                write!(f, "component implementation already registered: {value}")
            }
            Self::DuplicateExtensionType(value) => {
                write!(f, "extension type already registered: {value}")
            }
        }
    }
}

impl Error for CatalogError {}
