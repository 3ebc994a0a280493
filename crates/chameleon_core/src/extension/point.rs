//! Extension point and extension values.

use crate::component::instance::Component;
use crate::descriptor::element::DescriptorElement;
use std::any::Any;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Type-erased materialized extension payload.
pub type ExtensionPayload = Arc<dyn Any + Send + Sync>;

/// Builds a payload from one raw fragment.
pub type ExtensionFactory =
    Arc<dyn Fn(&DescriptorElement) -> Result<ExtensionPayload, ExtensionError> + Send + Sync>;

/// Typed extension materializer.
///
/// Implementors turn one descriptor fragment into an immutable value. Register
/// them under a type tag with
/// [`ImplementationCatalog::register_extension_type`](crate::ImplementationCatalog::register_extension_type).
pub trait Materialize: Sized + Send + Sync + 'static {
    fn materialize(element: &DescriptorElement) -> Result<Self, ExtensionError>;
}

/// Default extension type: the fragment's trimmed text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardExtension {
    value: String,
}

impl StandardExtension {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Materialize for StandardExtension {
    fn materialize(element: &DescriptorElement) -> Result<Self, ExtensionError> {
        Ok(Self {
            value: element.value().to_string(),
        })
    }
}

pub(crate) fn factory_for<T: Materialize>() -> ExtensionFactory {
    Arc::new(
        |element: &DescriptorElement| -> Result<ExtensionPayload, ExtensionError> {
            let value = T::materialize(element)?;
            Ok(Arc::new(value))
        },
    )
}

/// One typed contribution to an extension point.
#[derive(Clone)]
pub struct Extension {
    namespace: String,
    extension_type: String,
    contributor: Arc<Component>,
    element: DescriptorElement,
    payload: ExtensionPayload,
}

impl Extension {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Type tag the payload was materialized with.
    pub fn extension_type(&self) -> &str {
        &self.extension_type
    }

    /// Component whose descriptor declared this extension.
    pub fn contributor(&self) -> &Arc<Component> {
        &self.contributor
    }

    pub fn element(&self) -> &DescriptorElement {
        &self.element
    }

    /// Downcasts the payload; `None` when it was materialized as another type.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl Debug for Extension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("namespace", &self.namespace)
            .field("extension_type", &self.extension_type)
            .field("contributor", &self.contributor.identifier())
            .field("element", &self.element)
            .finish()
    }
}

/// Named contract that components contribute extensions to.
#[derive(Clone)]
pub struct ExtensionPoint {
    namespace: String,
    extension_type: String,
    declared_by: String,
    factory: ExtensionFactory,
    extensions: Vec<Extension>,
}

impl ExtensionPoint {
    pub(crate) fn new(
        namespace: &str,
        extension_type: &str,
        declared_by: &str,
        factory: ExtensionFactory,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            extension_type: extension_type.to_string(),
            declared_by: declared_by.to_string(),
            factory,
            extensions: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn extension_type(&self) -> &str {
        &self.extension_type
    }

    /// Identifier of the component whose declaration is active.
    pub fn declared_by(&self) -> &str {
        &self.declared_by
    }

    /// Extensions in contribution order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub(crate) fn create_extension(
        &mut self,
        element: &DescriptorElement,
        contributor: &Arc<Component>,
    ) -> Result<(), ExtensionError> {
        let payload = (self.factory)(element)?;
        self.extensions.push(Extension {
            namespace: self.namespace.clone(),
            extension_type: self.extension_type.clone(),
            contributor: Arc::clone(contributor),
            element: element.clone(),
            payload,
        });
        Ok(())
    }
}

impl Debug for ExtensionPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionPoint")
            .field("namespace", &self.namespace)
            .field("extension_type", &self.extension_type)
            .field("declared_by", &self.declared_by)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

/// Materializer failure for one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionError {
    message: String,
}

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing_attribute(name: &str) -> Self {
        Self::new(format!("missing required attribute `{name}`"))
    }
}

impl Display for ExtensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ExtensionError {}
