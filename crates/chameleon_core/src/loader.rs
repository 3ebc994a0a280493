//! Startup entry point.
//!
//! # Responsibility
//! - Scan the component root (and the optional bundle root) once.
//! - Resolve every indexed identifier and freeze the result.
//!
//! # Invariants
//! - Identifiers are resolved in scan order; requirements load first
//!   regardless of where they sit in that order.
//! - Under `ResolutionPolicy::Lenient` one failed component never prevents
//!   unrelated components from loading.

use crate::bundle::discover_bundles;
use crate::component::catalog::ImplementationCatalog;
use crate::component::folder_index::ComponentFolderIndex;
use crate::component::resolver::ComponentResolver;
use crate::config::RuntimeConfig;
use crate::error::LoaderResult;
use crate::runtime::RegistryHandle;
use log::{error, info};
use std::path::{Path, PathBuf};

/// What `resolve_all` does with a component that fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Record the failure and continue with the next identifier.
    #[default]
    Lenient,
    /// Stop at the first failure.
    FailFast,
}

/// Builder for one startup pass.
#[derive(Clone, Default)]
pub struct Loader {
    catalog: ImplementationCatalog,
    config: RuntimeConfig,
    bundle_root: Option<PathBuf>,
    policy: ResolutionPolicy,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: ImplementationCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the configuration with the file at `path`, or with defaults
    /// when the file does not exist.
    ///
    /// # Errors
    /// - `Config` when the file exists but cannot be read or parsed.
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> LoaderResult<Self> {
        self.config = RuntimeConfig::load_or_default(path)?;
        Ok(self)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn with_bundle_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.bundle_root = Some(root.into());
        self
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog_mut(&mut self) -> &mut ImplementationCatalog {
        &mut self.catalog
    }

    /// Scans `root` and returns a resolver ready for step-by-step resolution.
    ///
    /// # Errors
    /// - `RootUnreadable` when the component root or bundle root cannot be
    ///   listed.
    pub fn scan(&self, root: impl AsRef<Path>) -> LoaderResult<ComponentResolver> {
        let root = root.as_ref();
        let index = ComponentFolderIndex::scan(root)?;
        let bundles = match &self.bundle_root {
            Some(bundle_root) => discover_bundles(bundle_root)?,
            None => Vec::new(),
        };
        info!(
            "event=scan module=loader status=ok root={} components={} bundles={}",
            root.display(),
            index.len(),
            bundles.len()
        );

        Ok(
            ComponentResolver::new(index, self.catalog.clone(), self.config.clone())
                .with_bundles(bundles),
        )
    }

    /// Scans `root`, resolves every identifier found and freezes the result.
    ///
    /// # Errors
    /// - `RootUnreadable` when a root cannot be listed.
    /// - Under `ResolutionPolicy::FailFast`, the first resolution failure.
    pub fn resolve_all(&self, root: impl AsRef<Path>) -> LoaderResult<RegistryHandle> {
        let mut resolver = self.scan(root)?;
        let identifiers: Vec<String> = resolver
            .index()
            .identifiers()
            .map(str::to_string)
            .collect();

        for identifier in identifiers {
            if let Err(err) = resolver.resolve(&identifier) {
                error!(
                    "event=resolve module=loader status=error identifier={} error={}",
                    identifier, err
                );
                match self.policy {
                    ResolutionPolicy::FailFast => return Err(err),
                    ResolutionPolicy::Lenient => resolver.record_failure(err),
                }
            }
        }

        Ok(resolver.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::Loader;
    use crate::config::ConfigError;
    use crate::error::LoaderError;
    use std::fs;

    #[test]
    fn config_file_is_optional() {
        let root = tempfile::tempdir().expect("tempdir");
        let loader = Loader::new()
            .with_config_file(root.path().join("configuration.json"))
            .expect("absent file yields defaults");
        assert!(loader.config().disabled.is_empty());
    }

    #[test]
    fn config_file_feeds_the_loader() {
        let root = tempfile::tempdir().expect("tempdir");
        let file = root.path().join("configuration.json");
        fs::write(&file, r#"{ "disable": { "components": ["x"] }, "log": { "level": 3 } }"#)
            .expect("write configuration");

        let loader = Loader::new().with_config_file(&file).expect("load");
        assert!(loader.config().disabled.contains("x"));
        assert_eq!(loader.config().log_level, 3);
    }

    #[test]
    fn broken_config_file_is_a_loader_error() {
        let root = tempfile::tempdir().expect("tempdir");
        let file = root.path().join("configuration.json");
        fs::write(&file, "{ \"disable\": ").expect("write configuration");

        let err = Loader::new().with_config_file(&file).err().expect("parse failure");
        assert!(matches!(
            err,
            LoaderError::Config(ConfigError::Parse { path: Some(ref path), .. }) if path == &file
        ));
        assert!(err.to_string().contains("invalid configuration"));
    }
}
