// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for the tabfile tool.
//!
//! A small YAML file selects the legacy text encoding, the version tag used
//! when a conversion target gives no hint, and the log level:
//!
//! ```yaml
//! codec:
//!   encoding: windows-1252
//!   default_version: "FICHIER GUITAR PRO v5.10"
//! logging:
//!   level: debug
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use encoding_rs::{Encoding, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::format::Registry;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }
}

/// Codec settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodecConfig {
    /// WHATWG label of the 8-bit text encoding (e.g. "windows-1252")
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Version tag written when the output extension gives no hint
    #[serde(default)]
    pub default_version: Option<String>,
}

fn default_encoding() -> String {
    "windows-1252".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            default_version: None,
        }
    }
}

impl CodecConfig {
    /// Resolve the encoding label, falling back to windows-1252
    pub fn encoding(&self) -> &'static Encoding {
        match Encoding::for_label(self.encoding.as_bytes()) {
            Some(encoding) => encoding,
            None => {
                warn!(label = %self.encoding, "unknown text encoding, using windows-1252");
                WINDOWS_1252
            }
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

/// Load a configuration file and check its values
pub fn validate_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = Config::load(path)?;
    if Encoding::for_label(config.codec.encoding.as_bytes()).is_none() {
        bail!("Unknown text encoding: {:?}", config.codec.encoding);
    }
    if let Some(tag) = &config.codec.default_version {
        if !Registry::new().is_supported(tag) {
            bail!("Unsupported default version: {:?}", tag);
        }
    }
    if config.logging.level.parse::<tracing::Level>().is_err() {
        bail!("Unknown log level: {:?}", config.logging.level);
    }
    Ok(config)
}
