//! Configuration file support for c2ffi.
//!
//! c2ffi reads two configuration file locations:
//! - Global: `~/.c2ffi/config.toml` - User-wide defaults
//! - Project: `.c2ffi/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line flags
//! take precedence over both. A setting left out of a layer keeps the value
//! from the layer below; a setting present replaces it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::extract::HeaderScanner;
use crate::output::OutputFormat;

/// c2ffi configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Scanner settings
    pub scan: ScanConfig,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (json, sexp)
    pub format: Option<OutputFormat>,

    /// Pretty-print where the format supports it
    pub pretty: Option<bool>,
}

/// Header scanner settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Emit object-like `#define`s as constants
    pub macros: Option<bool>,

    /// Prefix stripped from declaration names
    pub strip_prefix: Option<String>,

    /// Functions to include (unset or empty = all)
    pub include_functions: Option<Vec<String>>,

    /// Functions to exclude
    pub exclude_functions: Option<Vec<String>>,

    /// Types to include (unset or empty = all)
    pub include_types: Option<Vec<String>>,

    /// Types to exclude
    pub exclude_types: Option<Vec<String>>,
}

impl ScanConfig {
    /// A scanner configured from these settings.
    pub fn scanner(&self) -> HeaderScanner {
        HeaderScanner::new()
            .with_macros(self.macros.unwrap_or(false))
            .with_strip_prefix(self.strip_prefix.clone())
            .with_include_functions(self.include_functions.clone().unwrap_or_default())
            .with_exclude_functions(self.exclude_functions.clone().unwrap_or_default())
            .with_include_types(self.include_types.clone().unwrap_or_default())
            .with_exclude_types(self.exclude_types.clone().unwrap_or_default())
    }

    fn merge(&mut self, other: ScanConfig) {
        if other.macros.is_some() {
            self.macros = other.macros;
        }
        if other.strip_prefix.is_some() {
            self.strip_prefix = other.strip_prefix;
        }
        if other.include_functions.is_some() {
            self.include_functions = other.include_functions;
        }
        if other.exclude_functions.is_some() {
            self.exclude_functions = other.exclude_functions;
        }
        if other.include_types.is_some() {
            self.include_types = other.include_types;
        }
        if other.exclude_types.is_some() {
            self.exclude_types = other.exclude_types;
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Every setting `other` sets replaces ours, filter lists included.
    pub fn merge(&mut self, other: Config) {
        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
        if other.output.pretty.is_some() {
            self.output.pretty = other.output.pretty;
        }
        self.scan.merge(other.scan);
    }

    /// The configured output format, or the default one.
    pub fn format(&self) -> OutputFormat {
        self.output.format.unwrap_or_default()
    }

    /// Whether to pretty-print (off unless set).
    pub fn pretty(&self) -> bool {
        self.output.pretty.unwrap_or(false)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.c2ffi/config.toml)
/// 2. Global config (~/.c2ffi/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global c2ffi config directory (~/.c2ffi).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".c2ffi"))
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|d| d.join("config.toml"))
}

/// Get the project config file path.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".c2ffi").join("config.toml")
}
