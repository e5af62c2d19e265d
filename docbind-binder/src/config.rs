//! Binder configuration, read from a TOML file such as `docbind.toml`:
//!
//! ```toml
//! max_depth = 16
//! cycle_guard = true
//! ```
//!
//! `max_depth = "unbounded"` turns the depth bound off.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::guard::TraversalGuard;

/// Default bound on object nesting for encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// The `max_depth` setting that disables the bound.
pub const UNBOUNDED: &str = "unbounded";

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderConfig {
    /// Maximum object nesting below the root; `None` is unbounded.
    #[serde(default = "default_max_depth", with = "depth_setting")]
    pub max_depth: Option<usize>,
    /// Reject object graphs that revisit an instance on the current path.
    /// Off by default: fetch plans are expected to describe acyclic traversals.
    #[serde(default)]
    pub cycle_guard: bool,
}

fn default_max_depth() -> Option<usize> {
    Some(DEFAULT_MAX_DEPTH)
}

mod depth_setting {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::UNBOUNDED;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Setting {
        Limit(usize),
        Named(String),
    }

    pub fn serialize<S: Serializer>(limit: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match limit {
            Some(limit) => serializer.serialize_u64(*limit as u64),
            None => serializer.serialize_str(UNBOUNDED),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        match Setting::deserialize(deserializer)? {
            Setting::Limit(limit) => Ok(Some(limit)),
            Setting::Named(name) if name == UNBOUNDED => Ok(None),
            Setting::Named(name) => Err(de::Error::custom(format!(
                "max_depth must be a number or \"{UNBOUNDED}\", got \"{name}\""
            ))),
        }
    }
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            cycle_guard: false,
        }
    }
}

impl BinderConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No binder config found at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(config) => {
                info!("Loaded binder config from {:?}", path);
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load binder config {:?}: {}. Falling back to defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }

    /// A fresh guard for one encode or decode pass.
    pub fn guard(&self) -> TraversalGuard {
        TraversalGuard::new(self.max_depth, self.cycle_guard)
    }
}
