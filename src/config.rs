//! Interpreter configuration
//!
//! Read from an optional TOML file; every key has a default.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Largest number of elements a range literal may materialize
    pub max_range_len: usize,
    /// Default `tracing` filter for the command-line tool
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_range_len: 1_000_000,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
