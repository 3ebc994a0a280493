//! Component implementation contract.

use crate::component::context::ComponentContext;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Behavior behind one loaded component.
///
/// Implementations are constructed by a factory registered in the
/// [`ImplementationCatalog`](crate::ImplementationCatalog) and must be shareable
/// across threads once startup completes.
pub trait ComponentBehavior: Send + Sync + 'static {
    /// Lifecycle hook run by the activation pass. Defaults to a no-op.
    fn invoke(&self, _context: &ComponentContext<'_>) -> Result<(), InvokeError> {
        Ok(())
    }
}

/// Implementation used when a descriptor names none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultBehavior;

impl ComponentBehavior for DefaultBehavior {}

/// Failure raised by a lifecycle hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeError {
    message: String,
}

impl InvokeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for InvokeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for InvokeError {}
