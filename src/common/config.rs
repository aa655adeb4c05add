//! Configuration file handling

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::paths::{config_path, EXTENSIONS_TOOL};
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Extensions tool location
    #[serde(default)]
    pub tool: ToolConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Message catalog: English text -> localized text
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

/// Where to find the engine extensions tool
#[derive(Debug, Deserialize)]
pub struct ToolConfig {
    /// Engine bin directory holding the tool
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,

    /// Executable name inside the bin directory
    #[serde(default = "default_tool_name")]
    pub name: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            bin_dir: None,
            name: default_tool_name(),
        }
    }
}

fn default_tool_name() -> String {
    EXTENSIONS_TOOL.to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize, Default)]
pub struct LoggingConfig {
    /// Additional log file; stderr logging is always on
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
