//! Monitor configuration, loadable from TOML:
//!
//! ```toml
//! path_prefix = "/home/me/project/src"
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::errors::ConfigError;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Only frames whose file path starts with this are checked.
    /// Empty observes every file that exists on disk.
    #[serde(default)]
    pub path_prefix: String,
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_prefix(mut self, path_prefix: impl Into<String>) -> Self {
        self.path_prefix = path_prefix.into();
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Whether frames from `file` are observed.
    pub fn observes(&self, file: &str) -> bool {
        file.starts_with(&self.path_prefix)
    }
}
