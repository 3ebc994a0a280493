//! Filesystem access for component descriptors.
//!
//! # Responsibility
//! - Enumerate component folders directly under a component root.
//! - Read and validate one folder's `component.json`.
//!
//! # Invariants
//! - Folders are visited in file-name order so scans are deterministic.
//! - Folders without a descriptor file are skipped silently.
//! - Each descriptor is parsed once; discovery hands the parsed value on.
//! - A malformed descriptor is logged and skipped; it never aborts the scan.
//! - No side effects beyond file reads.

use crate::descriptor::manifest::{ComponentDescriptor, COMPONENT_DESCRIPTOR_FILE};
use crate::error::{LoaderError, LoaderResult};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One component folder found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredComponent {
    pub identifier: String,
    pub version: String,
    pub path: PathBuf,
    pub descriptor: Arc<ComponentDescriptor>,
}

/// Returns `true` when `path` holds a component descriptor.
pub fn is_component_folder(path: &Path) -> bool {
    path.join(COMPONENT_DESCRIPTOR_FILE).is_file()
}

/// Lists immediate subfolders of `root`, sorted by file name.
pub(crate) fn sorted_subfolders(root: &Path) -> LoaderResult<Vec<PathBuf>> {
    let unreadable = |err: std::io::Error| LoaderError::RootUnreadable {
        path: root.to_path_buf(),
        message: err.to_string(),
    };

    let mut folders = Vec::new();
    for entry in fs::read_dir(root).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// Enumerates component folders under `root`.
///
/// # Errors
/// - `RootUnreadable` when `root` itself cannot be listed.
pub fn discover(root: impl AsRef<Path>) -> LoaderResult<Vec<DiscoveredComponent>> {
    let root = root.as_ref();
    let mut discovered = Vec::new();

    for folder in sorted_subfolders(root)? {
        if !is_component_folder(&folder) {
            continue;
        }
        debug!(
            "event=folder_scan module=descriptor status=start folder={}",
            folder.display()
        );
        match load(&folder) {
            Ok(descriptor) => discovered.push(DiscoveredComponent {
                identifier: descriptor.identifier.clone(),
                version: descriptor.version.clone(),
                path: folder,
                descriptor: Arc::new(descriptor),
            }),
            Err(err) => {
                warn!(
                    "event=folder_scan module=descriptor status=skip folder={} error={}",
                    folder.display(),
                    err
                );
            }
        }
    }

    Ok(discovered)
}

/// Loads the descriptor stored in component folder `path`.
///
/// # Errors
/// - `MalformedDescriptor` when the file is unreadable, not valid JSON, or
///   misses `identifier`/`version`.
pub fn load(path: impl AsRef<Path>) -> LoaderResult<ComponentDescriptor> {
    let file = path.as_ref().join(COMPONENT_DESCRIPTOR_FILE);
    let malformed = |reason: String| LoaderError::MalformedDescriptor {
        path: file.clone(),
        reason,
    };

    let text = fs::read_to_string(&file).map_err(|err| malformed(err.to_string()))?;
    ComponentDescriptor::from_json_str(&text).map_err(|err| malformed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{discover, load};
    use crate::error::LoaderError;
    use std::fs;
    use std::path::Path;

    fn write_descriptor(root: &Path, folder: &str, body: &str) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).expect("create component folder");
        fs::write(dir.join("component.json"), body).expect("write descriptor");
    }

    #[test]
    fn discovers_component_folders_in_name_order() {
        let root = tempfile::tempdir().expect("tempdir");
        write_descriptor(root.path(), "b_folder", r#"{ "identifier": "b", "version": "1" }"#);
        write_descriptor(root.path(), "a_folder", r#"{ "identifier": "a", "version": "2" }"#);
        fs::create_dir_all(root.path().join("no_descriptor")).expect("plain folder");
        fs::write(root.path().join("stray.txt"), "x").expect("plain file");

        let found = discover(root.path()).expect("discover");
        let ids: Vec<&str> = found.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(found[0].version, "2");
        assert!(found[0].path.ends_with("a_folder"));
        assert_eq!(found[0].descriptor.identifier, "a");
    }

    #[test]
    fn malformed_descriptor_is_skipped_not_fatal() {
        let root = tempfile::tempdir().expect("tempdir");
        write_descriptor(root.path(), "broken", r#"{ "version": "1" }"#);
        write_descriptor(root.path(), "fine", r#"{ "identifier": "fine", "version": "1" }"#);

        let found = discover(root.path()).expect("discover");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "fine");
    }

    #[test]
    fn load_reports_malformed_descriptor() {
        let root = tempfile::tempdir().expect("tempdir");
        write_descriptor(root.path(), "broken", r#"{ "identifier": "x" }"#);

        let err = load(root.path().join("broken")).unwrap_err();
        assert!(matches!(err, LoaderError::MalformedDescriptor { .. }));
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let root = tempfile::tempdir().expect("tempdir");
        let err = discover(root.path().join("missing")).unwrap_err();
        assert!(matches!(err, LoaderError::RootUnreadable { .. }));
    }
}
