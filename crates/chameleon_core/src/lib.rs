//! Component loader for Chameleon.
//!
//! Scans a component root for `component.json` descriptors, picks the newest
//! version of each identifier, resolves requirements, wires extension points
//! and extensions between components, and exposes the result as a frozen,
//! thread-safe registry.

pub mod activation;
pub mod bundle;
pub mod component;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod extension;
pub mod loader;
pub mod logging;
pub mod runtime;

pub use bundle::{discover_bundles, Bundle, BundleDescriptor, BUNDLE_DESCRIPTOR_FILE};
pub use component::behavior::{ComponentBehavior, DefaultBehavior, InvokeError};
pub use component::catalog::{CatalogError, ComponentInit, ImplementationCatalog};
pub use component::context::ComponentContext;
pub use component::folder_index::ComponentFolderIndex;
pub use component::instance::{ActivationState, Component};
pub use component::resolver::ComponentResolver;
pub use config::{ConfigError, DisabledSet, RuntimeConfig, CONFIGURATION_FILE};
pub use descriptor::element::DescriptorElement;
pub use descriptor::manifest::{
    ComponentDescriptor, DescriptorValidationError, COMPONENT_DESCRIPTOR_FILE,
};
pub use descriptor::version::compare_versions;
pub use error::{LoaderError, LoaderResult};
pub use extension::point::{Extension, ExtensionError, ExtensionPoint, Materialize, StandardExtension};
pub use extension::registry::{DuplicatePolicy, ExtensionRegistry};
pub use loader::{Loader, ResolutionPolicy};
pub use logging::{default_log_level, init_logging, level_from_mask, logging_status, LoggingError};
pub use runtime::{Registry, RegistryHandle};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
