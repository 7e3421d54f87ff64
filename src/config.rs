//! Configuration for the tasklist CLI
//!
//! Configuration is read from a YAML file, by default
//! `<config dir>/tasklist/config.yaml`. Every field is optional; a missing
//! file means built-in defaults.
//!
//! ```yaml
//! data_dir: /home/me/.local/share/tasklist
//! default_priority: high
//! default_category: personal
//! color: true
//! prefers_dark: false
//! ```

use crate::models::{DEFAULT_CATEGORY, Priority};
use crate::store::Defaults;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "tasklist";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the saved tasks and theme
    pub data_dir: Option<PathBuf>,
    pub default_priority: Priority,
    pub default_category: String,
    /// Colorize terminal output
    pub color: bool,
    /// Fallback when no theme has been saved yet
    pub prefers_dark: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_priority: Priority::default(),
            default_category: DEFAULT_CATEGORY.to_string(),
            color: true,
            prefers_dark: false,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.yaml"))
    }

    /// Load from `path`, or from the default location when None.
    ///
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Where task data lives: the configured directory or `<data dir>/tasklist`
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| eyre!("Could not determine a data directory; set data_dir in the config"))
    }

    /// Field values for tasks added without details
    pub fn defaults(&self) -> Defaults {
        let category = match self.default_category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };
        Defaults {
            priority: self.default_priority,
            category,
        }
    }
}
