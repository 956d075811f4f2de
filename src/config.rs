//! Configuration file support for filetree
//!
//! Reads from .filetree/config.toml, or the file named by `FILETREE_CONFIG`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::classify::Filters;
use crate::error::Result;

/// Env var overriding the config file location
pub const CONFIG_ENV: &str = "FILETREE_CONFIG";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Initial display filters
    #[serde(default)]
    pub filters: Filters,

    /// Stored user preferences (e.g. `theme = "night"`)
    #[serde(default)]
    pub preferences: HashMap<String, String>,

    /// Viewer server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Viewer server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    /// Default: 3003
    #[serde(default = "default_port")]
    pub port: u16,

    /// Render target id of the tree element in the viewer page
    /// Default: "filetree"
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_port() -> u16 {
    3003
}

fn default_target() -> String {
    "filetree".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            target: default_target(),
        }
    }
}

impl Config {
    /// Load config from .filetree/config.toml
    /// Returns default config if the file doesn't exist or can't be parsed
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            match Self::load_from(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Find config.toml: env override first, then walk up the directory tree
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".filetree").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }
}
