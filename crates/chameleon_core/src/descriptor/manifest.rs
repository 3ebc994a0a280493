//! Component descriptor declaration and validation.
//!
//! # Responsibility
//! - Define the logical descriptor schema (identity, requirements, extension
//!   point and extension declarations).
//! - Parse `component.json` text and reject descriptors missing required keys.
//!
//! # Invariants
//! - `identifier` is non-empty after trimming.
//! - `version` is present; an empty version is accepted here and excluded by
//!   the folder scan instead.
//! - Every declared namespace and requirement is non-empty.

use crate::descriptor::element::DescriptorElement;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// File name that marks a folder as a component folder.
pub const COMPONENT_DESCRIPTOR_FILE: &str = "component.json";

/// Extension type tag used when a point declares none.
pub const STANDARD_EXTENSION_TYPE: &str = "standard";

/// Declaration of one extension point owned by a component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionPointDeclaration {
    pub namespace: String,
    /// Type tag resolved through the implementation catalog.
    #[serde(rename = "type", default)]
    pub extension_type: String,
}

/// One raw extension fragment contributed to `namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionDeclaration {
    pub namespace: String,
    #[serde(flatten)]
    pub element: DescriptorElement,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    identifier: Option<String>,
    version: Option<String>,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    implementation: String,
    #[serde(default)]
    extension_points: Vec<ExtensionPointDeclaration>,
    #[serde(default)]
    extensions: Vec<ExtensionDeclaration>,
}

/// Parsed, immutable component descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Stable component identifier, e.g. `ch.anomey.security`.
    pub identifier: String,
    /// Free-form version compared with [`crate::compare_versions`].
    pub version: String,
    /// Identifiers that must be loaded before this component, in order.
    pub required_identifiers: Vec<String>,
    pub extension_point_declarations: Vec<ExtensionPointDeclaration>,
    pub extension_declarations: Vec<ExtensionDeclaration>,
    /// Catalog name of the implementation; empty selects the no-op default.
    pub implementation: String,
}

impl ComponentDescriptor {
    /// Parses and validates descriptor text.
    pub fn from_json_str(text: &str) -> Result<Self, DescriptorValidationError> {
        let raw: RawDescriptor = serde_json::from_str(text)
            .map_err(|err| DescriptorValidationError::Syntax(err.to_string()))?;

        let identifier = raw
            .identifier
            .ok_or(DescriptorValidationError::MissingField("identifier"))?
            .trim()
            .to_string();
        let version = raw
            .version
            .ok_or(DescriptorValidationError::MissingField("version"))?
            .trim()
            .to_string();

        let descriptor = Self {
            identifier,
            version,
            required_identifiers: raw
                .requires
                .iter()
                .map(|value| value.trim().to_string())
                .collect(),
            extension_point_declarations: raw
                .extension_points
                .into_iter()
                .map(|declaration| ExtensionPointDeclaration {
                    namespace: declaration.namespace.trim().to_string(),
                    extension_type: declaration.extension_type.trim().to_string(),
                })
                .collect(),
            extension_declarations: raw
                .extensions
                .into_iter()
                .map(|declaration| ExtensionDeclaration {
                    namespace: declaration.namespace.trim().to_string(),
                    element: declaration.element,
                })
                .collect(),
            implementation: raw.implementation.trim().to_string(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), DescriptorValidationError> {
        if self.identifier.trim().is_empty() {
            return Err(DescriptorValidationError::EmptyIdentifier);
        }
        if self
            .required_identifiers
            .iter()
            .any(|value| value.trim().is_empty())
        {
            return Err(DescriptorValidationError::EmptyRequirement);
        }
        for declaration in &self.extension_point_declarations {
            if declaration.namespace.trim().is_empty() {
                return Err(DescriptorValidationError::EmptyNamespace("extension point"));
            }
        }
        for declaration in &self.extension_declarations {
            if declaration.namespace.trim().is_empty() {
                return Err(DescriptorValidationError::EmptyNamespace("extension"));
            }
        }
        Ok(())
    }

    /// Extension fragments declared for `namespace`, in declaration order.
    pub fn extensions_for<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a DescriptorElement> + 'a {
        self.extension_declarations
            .iter()
            .filter(move |declaration| declaration.namespace == namespace)
            .map(|declaration| &declaration.element)
    }
}

/// Descriptor validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorValidationError {
    Syntax(String),
    MissingField(&'static str),
    EmptyIdentifier,
    EmptyRequirement,
    EmptyNamespace(&'static str),
}

impl Display for DescriptorValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(message) => write!(f, "descriptor is not valid JSON: {message}"),
            Self::MissingField(name) => write!(f, "descriptor missing required field: {name}"),
            Self::EmptyIdentifier => write!(f, "descriptor identifier must not be empty"),
            Self::EmptyRequirement => {
                write!(f, "descriptor contains an empty required identifier")
            }
            Self::EmptyNamespace(kind) => {
                write!(f, "descriptor {kind} declaration has an empty namespace")
            }
        }
    }
}

impl Error for DescriptorValidationError {}

#[cfg(test)]
mod tests {
    use super::{ComponentDescriptor, DescriptorValidationError};

    const FULL: &str = r#"{
        "identifier": " ch.anomey.security ",
        "version": "1.2",
        "requires": ["ch.anomey.util", " ch.anomey.storage "],
        "implementation": "security",
        "extensionPoints": [{ "namespace": "urn:security:provider", "type": "provider" }],
        "extensions": [
            { "namespace": "urn:processor", "value": " SecurityProcessor ",
              "attributes": { "priority": "10" } },
            { "namespace": "urn:security:provider", "name": "provider", "value": "text" }
        ]
    }"#;

    #[test]
    fn parses_full_descriptor() {
        let descriptor = ComponentDescriptor::from_json_str(FULL).expect("descriptor parse");
        assert_eq!(descriptor.identifier, "ch.anomey.security");
        assert_eq!(descriptor.version, "1.2");
        assert_eq!(
            descriptor.required_identifiers,
            vec!["ch.anomey.util".to_string(), "ch.anomey.storage".to_string()]
        );
        assert_eq!(descriptor.implementation, "security");
        assert_eq!(descriptor.extension_point_declarations[0].extension_type, "provider");

        let processors: Vec<_> = descriptor.extensions_for("urn:processor").collect();
        assert_eq!(processors.len(), 1);
        assert_eq!(processors[0].value(), "SecurityProcessor");
        assert_eq!(processors[0].attribute("priority"), Some("10"));
    }

    #[test]
    fn minimal_descriptor_uses_defaults() {
        let descriptor =
            ComponentDescriptor::from_json_str(r#"{ "identifier": "a", "version": "1.0" }"#)
                .expect("descriptor parse");
        assert!(descriptor.required_identifiers.is_empty());
        assert!(descriptor.implementation.is_empty());
        assert!(descriptor.extension_declarations.is_empty());
    }

    #[test]
    fn rejects_missing_identifier_and_version() {
        let err = ComponentDescriptor::from_json_str(r#"{ "version": "1.0" }"#).unwrap_err();
        assert_eq!(err, DescriptorValidationError::MissingField("identifier"));

        let err = ComponentDescriptor::from_json_str(r#"{ "identifier": "a" }"#).unwrap_err();
        assert_eq!(err, DescriptorValidationError::MissingField("version"));
    }

    #[test]
    fn accepts_empty_version() {
        let descriptor =
            ComponentDescriptor::from_json_str(r#"{ "identifier": "a", "version": " " }"#)
                .expect("empty version is a scan concern");
        assert!(descriptor.version.is_empty());
    }

    #[test]
    fn rejects_blank_identifier_and_namespace() {
        let err = ComponentDescriptor::from_json_str(r#"{ "identifier": "  ", "version": "1" }"#)
            .unwrap_err();
        assert_eq!(err, DescriptorValidationError::EmptyIdentifier);

        let err = ComponentDescriptor::from_json_str(
            r#"{ "identifier": "a", "version": "1", "extensionPoints": [{ "namespace": "" }] }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DescriptorValidationError::EmptyNamespace("extension point")
        );
    }

    #[test]
    fn rejects_invalid_json() {
        let err = ComponentDescriptor::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, DescriptorValidationError::Syntax(_)));
    }
}
