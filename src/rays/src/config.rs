//! Boundary configuration
//!
//! Read from a TOML file named by `RAYS_CONFIG`; every field is optional.
//!
//! ```toml
//! line_ending = "\r\n"
//! growth_attempts = 4
//! dot_syntax = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "RAYS_CONFIG";

const MAX_GROWTH_ATTEMPTS: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Line separator passed to the decompiler
    pub line_ending: String,
    /// Number of buffer sizes tried when re-serializing
    pub growth_attempts: u32,
    /// Force the decompiler dialect instead of using the container's flag
    pub dot_syntax: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_ending: "\n".to_string(),
            growth_attempts: 3,
            dot_syntax: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config.normalized())
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Load from `RAYS_CONFIG`, falling back to defaults when unset or unusable
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };

        match Self::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", CONFIG_ENV, e);
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Dialect to decompile with, given the container's own preference
    pub fn dot_syntax_for(&self, container_default: bool) -> bool {
        self.dot_syntax.unwrap_or(container_default)
    }

    fn normalized(mut self) -> Self {
        self.growth_attempts = self.growth_attempts.clamp(1, MAX_GROWTH_ATTEMPTS);
        self
    }
}
