//! Runtime configuration document.
//!
//! # Responsibility
//! - Read `configuration.json` once at startup.
//! - Expose the disabled component/bundle sets, log level mask, duplicate
//!   extension point policy and free-form properties.
//!
//! # Invariants
//! - Configuration is immutable after load; components only ever see it
//!   through a shared reference.

use crate::extension::registry::DuplicatePolicy;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Conventional configuration file name.
pub const CONFIGURATION_FILE: &str = "configuration.json";

/// Default log mask: errors, warnings and info (`1 | 2 | 4`).
pub const DEFAULT_LOG_LEVEL_MASK: u8 = 7;

/// Identifiers excluded from activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledSet {
    identifiers: BTreeSet<String>,
}

impl DisabledSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }

    pub(crate) fn insert(&mut self, identifier: &str) -> bool {
        self.identifiers.insert(identifier.trim().to_string())
    }
}

impl<S: AsRef<str>> FromIterator<S> for DisabledSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for value in iter {
            let value = value.as_ref().trim();
            if !value.is_empty() {
                set.insert(value);
            }
        }
        set
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDisable {
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    bundles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLog {
    #[serde(default = "default_log_mask")]
    level: u8,
}

impl Default for RawLog {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL_MASK,
        }
    }
}

fn default_log_mask() -> u8 {
    DEFAULT_LOG_LEVEL_MASK
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    disable: RawDisable,
    #[serde(default)]
    log: RawLog,
    #[serde(default)]
    duplicate_extension_points: DuplicatePolicy,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

/// Parsed startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub disabled: DisabledSet,
    pub disabled_bundles: DisabledSet,
    /// Bit mask: `1` error, `2` warn, `4` info, `8` trail.
    pub log_level: u8,
    pub duplicate_extension_points: DuplicatePolicy,
    pub properties: BTreeMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            disabled: DisabledSet::new(),
            disabled_bundles: DisabledSet::new(),
            log_level: DEFAULT_LOG_LEVEL_MASK,
            duplicate_extension_points: DuplicatePolicy::default(),
            properties: BTreeMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Parses configuration text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text).map_err(|err| ConfigError::Parse {
            path: None,
            message: err.to_string(),
        })?;
        Ok(Self {
            disabled: raw.disable.components.iter().collect(),
            disabled_bundles: raw.disable.bundles.iter().collect(),
            log_level: raw.log.level,
            duplicate_extension_points: raw.duplicate_extension_points,
            properties: raw.properties,
        })
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    /// - `Io` when the file cannot be read (including when it is absent).
    /// - `Parse` when the content is not a valid configuration document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_json_str(&text).map_err(|err| err.at(path))
    }

    /// Like [`RuntimeConfig::load`], but an absent file yields defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn with_disabled<S: AsRef<str>>(mut self, identifiers: impl IntoIterator<Item = S>) -> Self {
        for identifier in identifiers {
            self.disabled.insert(identifier.as_ref());
        }
        self
    }

    pub fn with_disabled_bundles<S: AsRef<str>>(
        mut self,
        identifiers: impl IntoIterator<Item = S>,
    ) -> Self {
        for identifier in identifiers {
            self.disabled_bundles.insert(identifier.as_ref());
        }
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_extension_points = policy;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Configuration load errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        message: String,
    },
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
}

impl ConfigError {
    fn at(self, path: &Path) -> Self {
        match self {
            Self::Parse { message, .. } => Self::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "failed to read configuration `{}`: {message}", path.display())
            }
            Self::Parse {
                path: Some(path),
                message,
            } => write!(f, "invalid configuration `{}`: {message}", path.display()),
            Self::Parse {
                path: None,
                message,
            } => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {}
