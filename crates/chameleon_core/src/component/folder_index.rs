//! Identifier to version to folder mapping built by the startup scan.
//!
//! # Invariants
//! - Identifiers iterate in scan order.
//! - Folders with an empty version never enter the index.
//! - The first folder seen for an `(identifier, version)` pair wins; later
//!   duplicates are logged and ignored.
//! - `latest` returns the greatest version; equal-ranking versions keep the
//!   first one seen.

use crate::descriptor::manifest::ComponentDescriptor;
use crate::descriptor::store::{discover, DiscoveredComponent};
use crate::descriptor::version::compare_versions;
use crate::error::LoaderResult;
use indexmap::IndexMap;
use log::{debug, warn};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexedFolder {
    version: String,
    path: PathBuf,
    descriptor: Arc<ComponentDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFolderIndex {
    folders: IndexMap<String, Vec<IndexedFolder>>,
}

impl ComponentFolderIndex {
    /// Scans `root` and indexes every usable component folder.
    pub fn scan(root: impl AsRef<Path>) -> LoaderResult<Self> {
        Ok(Self::build(discover(root)?))
    }

    pub fn build(discovered: impl IntoIterator<Item = DiscoveredComponent>) -> Self {
        let mut folders: IndexMap<String, Vec<IndexedFolder>> = IndexMap::new();

        for component in discovered {
            if component.version.is_empty() {
                warn!(
                    "event=folder_index module=component status=skip reason=empty_version identifier={} folder={}",
                    component.identifier,
                    component.path.display()
                );
                continue;
            }

            let versions = folders.entry(component.identifier.clone()).or_default();
            if versions.iter().any(|f| f.version == component.version) {
                warn!(
                    "event=folder_index module=component status=skip reason=duplicate_version identifier={} version={} folder={}",
                    component.identifier,
                    component.version,
                    component.path.display()
                );
                continue;
            }

            debug!(
                "event=folder_index module=component status=ok identifier={} version={} folder={}",
                component.identifier,
                component.version,
                component.path.display()
            );
            versions.push(IndexedFolder {
                version: component.version,
                path: component.path,
                descriptor: component.descriptor,
            });
        }

        folders.retain(|_, versions| !versions.is_empty());
        Self { folders }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.folders.contains_key(identifier)
    }

    /// Distinct identifiers in scan order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.folders.keys().map(String::as_str)
    }

    /// Indexed versions of `identifier` in scan order.
    pub fn versions(&self, identifier: &str) -> Vec<&str> {
        self.folders
            .get(identifier)
            .map(|versions| versions.iter().map(|f| f.version.as_str()).collect())
            .unwrap_or_default()
    }

    /// Greatest version of `identifier` and its folder.
    pub fn latest(&self, identifier: &str) -> Option<(&str, &Path)> {
        self.latest_folder(identifier)
            .map(|best| (best.version.as_str(), best.path.as_path()))
    }

    /// Folder and scanned descriptor of the greatest version of `identifier`.
    pub fn latest_descriptor(&self, identifier: &str) -> Option<(&Path, &Arc<ComponentDescriptor>)> {
        self.latest_folder(identifier)
            .map(|best| (best.path.as_path(), &best.descriptor))
    }

    fn latest_folder(&self, identifier: &str) -> Option<&IndexedFolder> {
        let versions = self.folders.get(identifier)?;
        let mut best = versions.first()?;
        for candidate in &versions[1..] {
            if compare_versions(&candidate.version, &best.version) == Ordering::Greater {
                best = candidate;
            }
        }
        Some(best)
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentFolderIndex;
    use crate::descriptor::manifest::ComponentDescriptor;
    use crate::descriptor::store::DiscoveredComponent;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn found(identifier: &str, version: &str, folder: &str) -> DiscoveredComponent {
        DiscoveredComponent {
            identifier: identifier.to_string(),
            version: version.to_string(),
            path: PathBuf::from(folder),
            descriptor: Arc::new(ComponentDescriptor {
                identifier: identifier.to_string(),
                version: version.to_string(),
                required_identifiers: Vec::new(),
                extension_point_declarations: Vec::new(),
                extension_declarations: Vec::new(),
                implementation: folder.to_string(),
            }),
        }
    }

    #[test]
    fn latest_picks_greatest_version() {
        let index = ComponentFolderIndex::build(vec![
            found("a", "1.0", "a_1.0"),
            found("a", "2.0", "a_2.0"),
            found("a", "1.5", "a_1.5"),
        ]);
        assert_eq!(index.latest("a"), Some(("2.0", Path::new("a_2.0"))));
        let (path, descriptor) = index.latest_descriptor("a").expect("selected");
        assert_eq!(path, Path::new("a_2.0"));
        assert_eq!(descriptor.implementation, "a_2.0");
        assert_eq!(index.versions("a"), vec!["1.0", "2.0", "1.5"]);
    }

    #[test]
    fn equal_versions_keep_first_seen() {
        let index = ComponentFolderIndex::build(vec![
            found("a", "1.0", "first"),
            found("a", "1-0", "second"),
            found("a", "1.0", "duplicate"),
        ]);
        assert_eq!(index.latest("a"), Some(("1.0", Path::new("first"))));
        assert_eq!(index.versions("a"), vec!["1.0", "1-0"]);
    }

    #[test]
    fn empty_version_is_excluded() {
        let index = ComponentFolderIndex::build(vec![
            found("ghost", "", "ghost"),
            found("b", "1", "b"),
            found("a", "1", "a"),
        ]);
        assert!(!index.contains("ghost"));
        assert_eq!(index.latest("ghost"), None);
        assert_eq!(index.identifiers().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(index.len(), 2);
    }
}
