//! TOML-based configuration for staq.
//!
//! Supports a config file (staq.toml) for the CLI; embedders construct
//! [`QuerySettings`] directly and thread it through compilation.
//!
//! Example configuration:
//! ```toml
//! [query]
//! default_top = 100
//! max_top = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Query compilation limits.
    pub query: QuerySettings,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.query.validate()?;
        Ok(settings)
    }
}

/// Limits applied while compiling a query.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Page size used when a query carries no `$top`.
    pub default_top: u64,
    /// Ceiling for `$top`; larger requests are clamped, not rejected.
    pub max_top: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_top: 100,
            max_top: 1000,
        }
    }
}

impl QuerySettings {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.default_top > self.max_top {
            return Err(SettingsError::InvalidConfig(format!(
                "default_top ({}) exceeds max_top ({})",
                self.default_top, self.max_top
            )));
        }
        Ok(())
    }
}
