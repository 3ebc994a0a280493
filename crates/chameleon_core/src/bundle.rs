//! Bundles: named groups of components.
//!
//! # Responsibility
//! - Read `bundle.json` folders under an optional bundle root.
//! - Let a disabled bundle disable every component it lists.
//! - Expose enabled bundles with the member components that actually loaded.
//!
//! # Invariants
//! - A bundle without an explicit identifier is identified by its folder name.
//! - The first bundle seen for an identifier wins.
//! - Missing members are warnings, never errors.

use crate::component::instance::Component;
use crate::descriptor::store::sorted_subfolders;
use crate::error::LoaderResult;
use log::warn;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// File name that marks a folder as a bundle folder.
pub const BUNDLE_DESCRIPTOR_FILE: &str = "bundle.json";

#[derive(Debug, Deserialize)]
struct RawBundle {
    identifier: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    update: String,
    #[serde(default)]
    components: Vec<String>,
}

/// Parsed bundle declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDescriptor {
    pub identifier: String,
    pub name: String,
    pub description: String,
    /// Update source declared by the bundle; informational only.
    pub update: String,
    /// Member component identifiers in declaration order.
    pub components: Vec<String>,
}

/// Reads every bundle folder under `root`, skipping unreadable ones.
pub fn discover_bundles(root: impl AsRef<Path>) -> LoaderResult<Vec<BundleDescriptor>> {
    let mut seen = BTreeSet::new();
    let mut bundles = Vec::new();

    for folder in sorted_subfolders(root.as_ref())? {
        let file = folder.join(BUNDLE_DESCRIPTOR_FILE);
        if !file.is_file() {
            continue;
        }
        let parsed = fs::read_to_string(&file)
            .map_err(|err| err.to_string())
            .and_then(|text| {
                serde_json::from_str::<RawBundle>(&text).map_err(|err| err.to_string())
            });
        let raw = match parsed {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=bundle_scan module=bundle status=skip file={} error={}",
                    file.display(),
                    err
                );
                continue;
            }
        };

        let folder_name = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let identifier = raw
            .identifier
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(folder_name);

        if !seen.insert(identifier.clone()) {
            warn!(
                "event=bundle_scan module=bundle status=skip reason=duplicate_identifier identifier={} file={}",
                identifier,
                file.display()
            );
            continue;
        }

        bundles.push(BundleDescriptor {
            identifier,
            name: raw.name.trim().to_string(),
            description: raw.description.trim().to_string(),
            update: raw.update.trim().to_string(),
            components: raw
                .components
                .iter()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect(),
        });
    }

    Ok(bundles)
}

/// Enabled bundle with its loaded members.
#[derive(Debug, Clone)]
pub struct Bundle {
    descriptor: BundleDescriptor,
    components: Vec<Arc<Component>>,
}

impl Bundle {
    pub(crate) fn new(descriptor: BundleDescriptor, components: Vec<Arc<Component>>) -> Self {
        Self {
            descriptor,
            components,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.descriptor.identifier
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    pub fn update(&self) -> &str {
        &self.descriptor.update
    }

    /// Member components that loaded, in declaration order.
    pub fn components(&self) -> &[Arc<Component>] {
        &self.components
    }

    pub fn descriptor(&self) -> &BundleDescriptor {
        &self.descriptor
    }
}
