//! Component registry and dependency resolver.
//!
//! # Responsibility
//! - Resolve one identifier to exactly one loaded component, loading its
//!   requirements first.
//! - Register each component's extension points, then materialize its
//!   extensions against every point known at that moment.
//!
//! # Invariants
//! - States move `Unloaded -> Loading -> Loaded` or end in `Rejected`.
//! - Re-entering an identifier that is `Loading` is a dependency cycle and
//!   never recurses further.
//! - A component is cached only after all of its requirements are loaded and
//!   its implementation and extension types are known, so failures never
//!   leave a partial entry.
//! - Extensions only reach points declared by this component or by
//!   components loaded before it.

use crate::bundle::{Bundle, BundleDescriptor};
use crate::component::catalog::{ComponentFactory, ComponentInit, ImplementationCatalog};
use crate::component::folder_index::ComponentFolderIndex;
use crate::component::instance::{ActivationState, Component};
use crate::config::{DisabledSet, RuntimeConfig};
use crate::descriptor::manifest::{ComponentDescriptor, STANDARD_EXTENSION_TYPE};
use crate::error::{LoaderError, LoaderResult};
use crate::extension::point::ExtensionFactory;
use crate::extension::registry::{DuplicatePolicy, ExtensionRegistry};
use crate::runtime::{Registry, RegistryHandle};
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum ResolveState {
    Loading,
    Disabled,
    Failed(LoaderError),
}

/// Mutable startup-time registry; frozen into a [`RegistryHandle`] by
/// [`ComponentResolver::finish`].
pub struct ComponentResolver {
    index: ComponentFolderIndex,
    catalog: ImplementationCatalog,
    config: Arc<RuntimeConfig>,
    disabled: DisabledSet,
    states: HashMap<String, ResolveState>,
    loading: Vec<String>,
    loaded: IndexMap<String, Arc<Component>>,
    extensions: ExtensionRegistry,
    bundles: Vec<BundleDescriptor>,
    failures: Vec<LoaderError>,
}

impl ComponentResolver {
    pub fn new(
        index: ComponentFolderIndex,
        catalog: ImplementationCatalog,
        config: RuntimeConfig,
    ) -> Self {
        let disabled = config.disabled.clone();
        let extensions = ExtensionRegistry::new(config.duplicate_extension_points);
        Self {
            index,
            catalog,
            config: Arc::new(config),
            disabled,
            states: HashMap::new(),
            loading: Vec::new(),
            loaded: IndexMap::new(),
            extensions,
            bundles: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Registers bundles discovered before resolution.
    ///
    /// Members of bundles listed in the configuration's disabled bundles join
    /// the disabled set; enabled bundles are materialized by `finish`.
    pub(crate) fn with_bundles(mut self, bundles: Vec<BundleDescriptor>) -> Self {
        for bundle in bundles {
            if self.config.disabled_bundles.contains(&bundle.identifier) {
                for member in &bundle.components {
                    self.disabled.insert(member);
                    debug!(
                        "event=bundle_disable module=bundle status=ok bundle={} component={}",
                        bundle.identifier, member
                    );
                }
                continue;
            }
            self.bundles.push(bundle);
        }
        self
    }

    pub fn index(&self) -> &ComponentFolderIndex {
        &self.index
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub fn is_disabled(&self, identifier: &str) -> bool {
        self.disabled.contains(identifier)
    }

    pub fn state(&self, identifier: &str) -> ActivationState {
        if self.loaded.contains_key(identifier) {
            return ActivationState::Loaded;
        }
        match self.states.get(identifier) {
            Some(ResolveState::Loading) => ActivationState::Loading,
            Some(ResolveState::Disabled | ResolveState::Failed(_)) => ActivationState::Rejected,
            None => ActivationState::Unloaded,
        }
    }

    /// Loaded components in load order.
    pub fn loaded(&self) -> impl Iterator<Item = &Arc<Component>> {
        self.loaded.values()
    }

    /// Resolves `identifier`, loading its requirements first.
    ///
    /// Returns `Ok(None)` when the identifier is disabled.
    ///
    /// # Errors
    /// - `ComponentNotFound` when no folder holds the identifier.
    /// - `ComponentMissing` when a requirement cannot be satisfied, including
    ///   dependency cycles.
    /// - `UnknownImplementation`, `UnknownExtensionType`,
    ///   `DuplicateExtensionPoint` for failures of the component itself.
    pub fn resolve(&mut self, identifier: &str) -> LoaderResult<Option<Arc<Component>>> {
        let identifier = identifier.trim();
        if let Some(component) = self.loaded.get(identifier) {
            return Ok(Some(Arc::clone(component)));
        }

        match self.states.get(identifier) {
            Some(ResolveState::Loading) => return Err(self.cycle_error(identifier)),
            Some(ResolveState::Disabled) => return Ok(None),
            Some(ResolveState::Failed(err)) => return Err(err.clone()),
            None => {}
        }

        if self.disabled.contains(identifier) {
            debug!(
                "event=component_load module=component status=skip reason=disabled identifier={}",
                identifier
            );
            self.states
                .insert(identifier.to_string(), ResolveState::Disabled);
            return Ok(None);
        }

        let Some((path, descriptor)) = self.index.latest_descriptor(identifier) else {
            error!(
                "event=component_load module=component status=error reason=not_found identifier={}",
                identifier
            );
            return Err(LoaderError::ComponentNotFound(identifier.to_string()));
        };
        let path = path.to_path_buf();
        let descriptor = Arc::clone(descriptor);
        debug!(
            "event=component_load module=component status=start identifier={} version={} folder={}",
            identifier,
            descriptor.version,
            path.display()
        );

        self.states
            .insert(identifier.to_string(), ResolveState::Loading);
        self.loading.push(identifier.to_string());
        let result = self.load_component(identifier, &path, &descriptor);
        self.loading.pop();

        match result {
            Ok(component) => {
                self.states.remove(identifier);
                info!(
                    "event=component_load module=component status=ok identifier={} version={}",
                    component.identifier(),
                    component.version()
                );
                Ok(Some(component))
            }
            Err(err) => {
                warn!(
                    "event=component_load module=component status=error identifier={} error={}",
                    identifier, err
                );
                self.states
                    .insert(identifier.to_string(), ResolveState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    fn cycle_error(&self, identifier: &str) -> LoaderError {
        let start = self
            .loading
            .iter()
            .position(|id| id == identifier)
            .unwrap_or(0);
        let mut chain: Vec<String> = self.loading[start..].to_vec();
        chain.push(identifier.to_string());
        LoaderError::DependencyCycle { chain }
    }

    fn load_component(
        &mut self,
        identifier: &str,
        path: &Path,
        descriptor: &ComponentDescriptor,
    ) -> LoaderResult<Arc<Component>> {
        for required in &descriptor.required_identifiers {
            match self.resolve(required) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return Err(LoaderError::missing(
                        identifier,
                        required,
                        LoaderError::Disabled(required.clone()),
                    ))
                }
                Err(err) => return Err(LoaderError::missing(identifier, required, err)),
            }
        }

        let factory = self.component_factory(descriptor)?;
        let point_factories = self.point_factories(descriptor)?;

        let implementation = factory(&ComponentInit {
            identifier,
            version: &descriptor.version,
            required_identifiers: &descriptor.required_identifiers,
            path,
            config: &self.config,
        });
        let component = Arc::new(Component::new(
            identifier,
            &descriptor.version,
            path,
            &descriptor.required_identifiers,
            implementation,
        ));
        self.loaded
            .insert(identifier.to_string(), Arc::clone(&component));

        for (declaration, factory) in descriptor
            .extension_point_declarations
            .iter()
            .zip(point_factories)
        {
            self.extensions.register_extension_point(
                &declaration.namespace,
                extension_type_tag(&declaration.extension_type),
                factory,
                identifier,
            )?;
        }

        self.materialize_extensions(descriptor, &component);
        Ok(component)
    }

    fn component_factory(&self, descriptor: &ComponentDescriptor) -> LoaderResult<ComponentFactory> {
        self.catalog
            .component_factory(&descriptor.implementation)
            .ok_or_else(|| LoaderError::UnknownImplementation {
                component: descriptor.identifier.clone(),
                implementation: descriptor.implementation.clone(),
            })
    }

    /// Looks up every declared extension type and checks the duplicate policy
    /// before anything is registered.
    fn point_factories(&self, descriptor: &ComponentDescriptor) -> LoaderResult<Vec<ExtensionFactory>> {
        let mut factories = Vec::with_capacity(descriptor.extension_point_declarations.len());
        for (position, declaration) in descriptor.extension_point_declarations.iter().enumerate() {
            self.extensions
                .check_declarable(&declaration.namespace, &descriptor.identifier)?;
            let declared_earlier = descriptor.extension_point_declarations[..position]
                .iter()
                .any(|earlier| earlier.namespace == declaration.namespace);
            if declared_earlier && self.extensions.policy() == DuplicatePolicy::Strict {
                return Err(LoaderError::DuplicateExtensionPoint {
                    namespace: declaration.namespace.clone(),
                    component: descriptor.identifier.clone(),
                });
            }

            let factory = self
                .catalog
                .extension_factory(&declaration.extension_type)
                .ok_or_else(|| LoaderError::UnknownExtensionType {
                    component: descriptor.identifier.clone(),
                    namespace: declaration.namespace.clone(),
                    extension_type: declaration.extension_type.clone(),
                })?;
            factories.push(factory);
        }
        Ok(factories)
    }

    fn materialize_extensions(&mut self, descriptor: &ComponentDescriptor, component: &Arc<Component>) {
        let namespaces: Vec<String> = self.extensions.namespaces().map(str::to_string).collect();
        for namespace in namespaces {
            for element in descriptor.extensions_for(&namespace) {
                match self
                    .extensions
                    .materialize_extension(&namespace, element, component)
                {
                    Ok(_) => debug!(
                        "event=extension_load module=extension status=ok namespace={} contributor={}",
                        namespace,
                        component.identifier()
                    ),
                    Err(err) => warn!(
                        "event=extension_load module=extension status=skip namespace={} contributor={} error={}",
                        namespace,
                        component.identifier(),
                        err
                    ),
                }
            }
        }
    }

    pub(crate) fn record_failure(&mut self, err: LoaderError) {
        self.failures.push(err);
    }

    /// Freezes the registry for read-only, shareable use.
    pub fn finish(self) -> RegistryHandle {
        let bundles = self
            .bundles
            .into_iter()
            .map(|descriptor| {
                let members = descriptor
                    .components
                    .iter()
                    .filter_map(|member| match self.loaded.get(member) {
                        Some(component) => Some(Arc::clone(component)),
                        None => {
                            warn!(
                                "event=bundle_load module=bundle status=partial bundle={} missing_component={}",
                                descriptor.identifier, member
                            );
                            None
                        }
                    })
                    .collect();
                (descriptor.identifier.clone(), Bundle::new(descriptor, members))
            })
            .collect();

        info!(
            "event=registry_freeze module=component status=ok components={} extension_points={} failures={}",
            self.loaded.len(),
            self.extensions.len(),
            self.failures.len()
        );

        RegistryHandle::new(Registry::new(
            self.loaded,
            self.extensions,
            bundles,
            self.failures,
            self.config,
        ))
    }
}

fn extension_type_tag(declared: &str) -> &str {
    if declared.is_empty() {
        STANDARD_EXTENSION_TYPE
    } else {
        declared
    }
}
