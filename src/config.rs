//! Shell configuration loaded from TOML
//!
//! ```toml
//! key = "D harmonicMinor"
//!
//! [engine.params]
//! tempo = 90
//!
//! [engine.weights.prev]
//! voiceDistance = 0.5
//! ```

use anyhow::{Context, Result};
use chorale_core::{EngineConfig, Scale};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "chorale.toml";
const DEFAULT_KEY: &str = "C major";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Starting key, e.g. "F minor"
    pub key: String,
    pub engine: EngineConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            key: DEFAULT_KEY.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Parse a TOML document, rejecting keys that don't name a scale.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ShellConfig = toml::from_str(text).context("malformed configuration")?;
        config.scale()?;
        Ok(config)
    }

    pub fn scale(&self) -> Result<Scale> {
        self.key
            .parse()
            .with_context(|| format!("invalid key '{}'", self.key))
    }

    /// Read `path`, or `chorale.toml` if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    log::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("in {}", path.display()))?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }
}
