//! Activated component objects.

use crate::component::behavior::{ComponentBehavior, InvokeError};
use crate::component::context::ComponentContext;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Constructed implementation, kept both as a hook and as a downcastable value.
#[derive(Clone)]
pub struct Implementation {
    hook: Arc<dyn ComponentBehavior>,
    instance: Arc<dyn Any + Send + Sync>,
}

impl Implementation {
    pub fn new<T: ComponentBehavior>(value: T) -> Self {
        let value = Arc::new(value);
        Self {
            hook: value.clone(),
            instance: value,
        }
    }
}

/// Activation state of one identifier during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Unloaded,
    Loading,
    Loaded,
    Rejected,
}

/// One loaded component. Exactly one instance exists per identifier.
pub struct Component {
    identifier: String,
    version: String,
    path: PathBuf,
    required_identifiers: Vec<String>,
    implementation: Implementation,
}

impl Component {
    pub(crate) fn new(
        identifier: &str,
        version: &str,
        path: &Path,
        required_identifiers: &[String],
        implementation: Implementation,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            version: version.to_string(),
            path: path.to_path_buf(),
            required_identifiers: required_identifiers.to_vec(),
            implementation,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Folder the descriptor was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn required_identifiers(&self) -> &[String] {
        &self.required_identifiers
    }

    /// Concrete implementation, when it is a `T`.
    pub fn behavior<T: ComponentBehavior>(&self) -> Option<&T> {
        self.implementation.instance.downcast_ref::<T>()
    }

    pub(crate) fn invoke(&self, context: &ComponentContext<'_>) -> Result<(), InvokeError> {
        self.implementation.hook.invoke(context)
    }

    #[cfg(test)]
    pub(crate) fn for_tests<T: ComponentBehavior>(identifier: &str, behavior: T) -> Self {
        Self::new(
            identifier,
            "1.0",
            Path::new(identifier),
            &[],
            Implementation::new(behavior),
        )
    }
}

impl Debug for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("identifier", &self.identifier)
            .field("version", &self.version)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Component;
    use crate::component::behavior::{ComponentBehavior, DefaultBehavior};

    struct Counter {
        start: u32,
    }

    impl ComponentBehavior for Counter {}

    #[test]
    fn downcasts_to_concrete_behavior() {
        let component = Component::for_tests("counter", Counter { start: 7 });
        assert_eq!(component.behavior::<Counter>().expect("counter").start, 7);
        assert!(component.behavior::<DefaultBehavior>().is_none());
    }
}
