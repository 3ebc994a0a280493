//! Activation driver.
//!
//! # Responsibility
//! - Run every loaded component's lifecycle hook once, in load order.
//! - Run a single component's hook on request.
//!
//! # Invariants
//! - Every hook sees a fully frozen registry; requirements were loaded (and
//!   invoked) before their dependents.
//! - The first failing hook stops `invoke_all`.

use crate::component::context::ComponentContext;
use crate::component::instance::Component;
use crate::error::{LoaderError, LoaderResult};
use crate::runtime::Registry;
use log::{debug, info, warn};
use std::sync::Arc;

impl Registry {
    /// Invokes every loaded component in load order.
    ///
    /// # Errors
    /// - `Invocation` for the first hook that fails; later hooks do not run.
    pub fn invoke_all(&self) -> LoaderResult<()> {
        let mut invoked = 0usize;
        for component in self.components() {
            self.invoke_component(component)?;
            invoked += 1;
        }
        info!(
            "event=invoke_all module=activation status=ok invoked={}",
            invoked
        );
        Ok(())
    }

    /// Invokes one component's hook.
    ///
    /// An identifier that is not loaded is logged and ignored.
    ///
    /// # Errors
    /// - `Invocation` when the hook fails.
    pub fn invoke(&self, identifier: &str) -> LoaderResult<()> {
        match self.find_component(identifier) {
            Some(component) => self.invoke_component(component),
            None => {
                warn!(
                    "event=invoke module=activation status=skip reason=not_loaded identifier={}",
                    identifier
                );
                Ok(())
            }
        }
    }

    fn invoke_component(&self, component: &Arc<Component>) -> LoaderResult<()> {
        let context = ComponentContext::new(self, component);
        component.invoke(&context).map_err(|source| {
            warn!(
                "event=invoke module=activation status=error identifier={} error={}",
                component.identifier(),
                source
            );
            LoaderError::Invocation {
                component: component.identifier().to_string(),
                source,
            }
        })?;
        debug!(
            "event=invoke module=activation status=ok identifier={}",
            component.identifier()
        );
        Ok(())
    }
}
