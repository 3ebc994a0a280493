//! Loader error contract.
//!
//! # Responsibility
//! - Name every way discovery, resolution and activation can fail.
//! - Render failures with the identifier and requirement chain involved.
//!
//! # Invariants
//! - `ComponentMissing` always names the requesting and the unmet identifier.
//! - `DependencyCycle` and `Disabled` only surface as the `cause` of a
//!   `ComponentMissing`; callers match on the outer variant.

use crate::component::behavior::InvokeError;
use crate::config::ConfigError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type LoaderResult<T> = Result<T, LoaderError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    RootUnreadable {
        path: PathBuf,
        message: String,
    },
    MalformedDescriptor {
        path: PathBuf,
        reason: String,
    },
    ComponentNotFound(String),
    ComponentMissing {
        component: String,
        required: String,
        cause: Box<LoaderError>,
    },
    DependencyCycle {
        chain: Vec<String>,
    },
    Disabled(String),
    DuplicateExtensionPoint {
        namespace: String,
        component: String,
    },
    UnknownImplementation {
        component: String,
        implementation: String,
    },
    UnknownExtensionType {
        component: String,
        namespace: String,
        extension_type: String,
    },
    Invocation {
        component: String,
        source: InvokeError,
    },
    Config(ConfigError),
}

impl LoaderError {
    pub(crate) fn missing(component: &str, required: &str, cause: LoaderError) -> Self {
        Self::ComponentMissing {
            component: component.to_string(),
            required: required.to_string(),
            cause: Box::new(cause),
        }
    }

    /// Identifiers from the requesting component down to the innermost unmet
    /// requirement, e.g. `[a, b, c]` for "a requires b requires c".
    pub fn requirement_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let Self::ComponentMissing {
            component,
            required,
            cause,
        } = current
        {
            if chain.is_empty() {
                chain.push(component.as_str());
            }
            chain.push(required.as_str());
            current = cause;
        }
        chain
    }

    /// Innermost error behind any `ComponentMissing` wrapping.
    pub fn root_cause(&self) -> &LoaderError {
        let mut current = self;
        while let Self::ComponentMissing { cause, .. } = current {
            current = cause;
        }
        current
    }
}

impl Display for LoaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RootUnreadable { path, message } => {
                write!(f, "component root `{}` is unreadable: {message}", path.display())
            }
            Self::MalformedDescriptor { path, reason } => {
                write!(f, "malformed descriptor `{}`: {reason}", path.display())
            }
            Self::ComponentNotFound(id) => write!(f, "component `{id}` not found"),
            Self::ComponentMissing {
                component,
                required,
                cause,
            } => write!(
                f,
                "component `{component}` requires `{required}` which could not be loaded: {cause}"
            ),
            Self::DependencyCycle { chain } => {
                write!(f, "dependency cycle: {}", chain.join(" -> "))
            }
            Self::Disabled(id) => write!(f, "component `{id}` is disabled"),
            Self::DuplicateExtensionPoint {
                namespace,
                component,
            } => write!(
                f,
                "extension point `{namespace}` declared again by `{component}`"
            ),
            Self::UnknownImplementation {
                component,
                implementation,
            } => write!(
                f,
                "component `{component}` names unknown implementation `{implementation}`"
            ),
            Self::UnknownExtensionType {
                component,
                namespace,
                extension_type,
            } => write!(
                f,
                "component `{component}` declares `{namespace}` with unknown extension type `{extension_type}`"
            ),
            Self::Invocation { component, source } => {
                write!(f, "component `{component}` failed during invoke: {source}")
            }
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ComponentMissing { cause, .. } => Some(cause.as_ref()),
            Self::Invocation { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for LoaderError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

#[cfg(test)]
mod tests {
    use super::LoaderError;

    fn chained() -> LoaderError {
        LoaderError::missing(
            "a",
            "b",
            LoaderError::missing("b", "c", LoaderError::ComponentNotFound("c".to_string())),
        )
    }

    #[test]
    fn requirement_chain_walks_nested_missing_errors() {
        assert_eq!(chained().requirement_chain(), vec!["a", "b", "c"]);
        assert!(LoaderError::ComponentNotFound("x".to_string())
            .requirement_chain()
            .is_empty());
    }

    #[test]
    fn root_cause_unwraps_to_innermost() {
        assert_eq!(
            chained().root_cause(),
            &LoaderError::ComponentNotFound("c".to_string())
        );
    }

    #[test]
    fn display_names_every_link() {
        let message = chained().to_string();
        assert!(message.contains("`a` requires `b`"));
        assert!(message.contains("`b` requires `c`"));
        assert!(message.ends_with("component `c` not found"));
    }
}
