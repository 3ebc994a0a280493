//! Namespace-keyed extension point registry.
//!
//! # Responsibility
//! - Map each namespace to exactly one active `ExtensionPoint`.
//! - Materialize raw fragments against the active point's extension type.
//! - Answer extension queries without ever failing.
//!
//! # Invariants
//! - At most one point per namespace. Re-declaration replaces the previous
//!   point (and drops its extensions) under `Overwrite`, and is rejected
//!   under `Strict`.
//! - Points iterate in first-declaration order; extensions in contribution
//!   order.

use crate::component::instance::Component;
use crate::descriptor::element::DescriptorElement;
use crate::error::{LoaderError, LoaderResult};
use crate::extension::point::{Extension, ExtensionError, ExtensionFactory, ExtensionPoint};
use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use std::sync::Arc;

/// What happens when a namespace is declared a second time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Last declaration wins; a warning is logged.
    #[default]
    Overwrite,
    /// Re-declaration fails the declaring component.
    Strict,
}

#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    points: IndexMap<String, ExtensionPoint>,
    policy: DuplicatePolicy,
}

impl ExtensionRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            points: IndexMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Fails when `namespace` may not be declared by `component` under the
    /// current policy.
    pub fn check_declarable(&self, namespace: &str, component: &str) -> LoaderResult<()> {
        if self.policy == DuplicatePolicy::Strict && self.points.contains_key(namespace) {
            return Err(LoaderError::DuplicateExtensionPoint {
                namespace: namespace.to_string(),
                component: component.to_string(),
            });
        }
        Ok(())
    }

    /// Registers an extension point for `namespace`.
    ///
    /// # Errors
    /// - `DuplicateExtensionPoint` under `DuplicatePolicy::Strict` when the
    ///   namespace is already declared.
    pub fn register_extension_point(
        &mut self,
        namespace: &str,
        extension_type: &str,
        factory: ExtensionFactory,
        declared_by: &str,
    ) -> LoaderResult<()> {
        self.check_declarable(namespace, declared_by)?;

        let point = ExtensionPoint::new(namespace, extension_type, declared_by, factory);
        if let Some(previous) = self.points.insert(namespace.to_string(), point) {
            warn!(
                "event=extension_point_redeclared module=extension status=overwrite namespace={} previous_owner={} previous_type={} owner={} type={} dropped_extensions={}",
                namespace,
                previous.declared_by(),
                previous.extension_type(),
                declared_by,
                extension_type,
                previous.extensions().len()
            );
        }
        Ok(())
    }

    /// Materializes one fragment into the point registered for `namespace`.
    ///
    /// Returns `Ok(false)` without side effects when no such point exists.
    pub fn materialize_extension(
        &mut self,
        namespace: &str,
        element: &DescriptorElement,
        contributor: &Arc<Component>,
    ) -> Result<bool, ExtensionError> {
        let Some(point) = self.points.get_mut(namespace) else {
            return Ok(false);
        };
        point.create_extension(element, contributor)?;
        Ok(true)
    }

    /// Extensions contributed to `namespace`; empty for unknown namespaces.
    pub fn query(&self, namespace: &str) -> &[Extension] {
        self.points
            .get(namespace)
            .map(ExtensionPoint::extensions)
            .unwrap_or(&[])
    }

    pub fn extension_point(&self, namespace: &str) -> Option<&ExtensionPoint> {
        self.points.get(namespace)
    }

    /// Declared namespaces in first-declaration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DuplicatePolicy, ExtensionRegistry};
    use crate::component::behavior::DefaultBehavior;
    use crate::component::instance::Component;
    use crate::descriptor::element::DescriptorElement;
    use crate::error::LoaderError;
    use crate::extension::point::{factory_for, ExtensionError, Materialize, StandardExtension};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Upper(String);

    impl Materialize for Upper {
        fn materialize(element: &DescriptorElement) -> Result<Self, ExtensionError> {
            Ok(Self(element.value().to_uppercase()))
        }
    }

    fn component(id: &str) -> Arc<Component> {
        Arc::new(Component::for_tests(id, DefaultBehavior))
    }

    fn fragment(value: &str) -> DescriptorElement {
        DescriptorElement::new("extension").with_value(value)
    }

    #[test]
    fn query_unknown_namespace_is_empty() {
        let registry = ExtensionRegistry::default();
        assert!(registry.query("urn:missing").is_empty());
        assert!(registry.extension_point("urn:missing").is_none());
    }

    #[test]
    fn materialize_without_point_is_a_noop() {
        let mut registry = ExtensionRegistry::default();
        let added = registry
            .materialize_extension("urn:missing", &fragment("x"), &component("a"))
            .expect("noop");
        assert!(!added);
        assert!(registry.is_empty());
    }

    #[test]
    fn extensions_keep_contribution_order_and_contributor() {
        let mut registry = ExtensionRegistry::default();
        registry
            .register_extension_point("ns", "standard", factory_for::<StandardExtension>(), "p1")
            .expect("register");
        registry
            .materialize_extension("ns", &fragment("first"), &component("p2"))
            .expect("materialize");
        registry
            .materialize_extension("ns", &fragment("second"), &component("p3"))
            .expect("materialize");

        let values: Vec<&str> = registry
            .query("ns")
            .iter()
            .map(|e| e.payload::<StandardExtension>().expect("standard").value())
            .collect();
        assert_eq!(values, vec!["first", "second"]);
        assert_eq!(registry.query("ns")[1].contributor().identifier(), "p3");
    }

    #[test]
    fn redeclaration_overwrites_and_switches_type() {
        let mut registry = ExtensionRegistry::new(DuplicatePolicy::Overwrite);
        registry
            .register_extension_point("ns", "standard", factory_for::<StandardExtension>(), "p1")
            .expect("register");
        registry
            .materialize_extension("ns", &fragment("old"), &component("p2"))
            .expect("materialize");
        registry
            .register_extension_point("ns", "upper", factory_for::<Upper>(), "p3")
            .expect("overwrite");
        registry
            .materialize_extension("ns", &fragment("new"), &component("p4"))
            .expect("materialize");

        let extensions = registry.query("ns");
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions[0].extension_type(), "upper");
        assert_eq!(extensions[0].payload::<Upper>().expect("upper").0, "NEW");
        assert_eq!(registry.extension_point("ns").expect("point").declared_by(), "p3");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn strict_policy_rejects_redeclaration() {
        let mut registry = ExtensionRegistry::new(DuplicatePolicy::Strict);
        registry
            .register_extension_point("ns", "standard", factory_for::<StandardExtension>(), "p1")
            .expect("register");
        let err = registry
            .register_extension_point("ns", "standard", factory_for::<StandardExtension>(), "p2")
            .unwrap_err();
        assert!(matches!(err, LoaderError::DuplicateExtensionPoint { .. }));
        assert_eq!(registry.extension_point("ns").expect("point").declared_by(), "p1");
    }

    #[test]
    fn failing_materializer_adds_nothing() {
        #[derive(Debug)]
        struct Strict;
        impl Materialize for Strict {
            fn materialize(element: &DescriptorElement) -> Result<Self, ExtensionError> {
                element
                    .attribute("class")
                    .map(|_| Strict)
                    .ok_or_else(|| ExtensionError::missing_attribute("class"))
            }
        }

        let mut registry = ExtensionRegistry::default();
        registry
            .register_extension_point("ns", "strict", factory_for::<Strict>(), "p1")
            .expect("register");
        let err = registry
            .materialize_extension("ns", &fragment("x"), &component("p2"))
            .unwrap_err();
        assert!(err.to_string().contains("class"));
        assert!(registry.query("ns").is_empty());
    }
}
