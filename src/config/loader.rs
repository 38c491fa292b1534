//! Configuration loader for memwalk
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use crate::memory::scanner::FanOut;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the concurrent strategy is configured to fan out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOutMode {
    Unbounded,
    Pooled,
}

impl FanOutMode {
    fn from_default(name: &str) -> Self {
        match name {
            "pooled" => FanOutMode::Pooled,
            _ => FanOutMode::Unbounded,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_fan_out")]
    pub fan_out: FanOutMode,
    /// Worker count for the pooled fan-out
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default = "default_timing_iterations")]
    pub timing_iterations: u32,
}

impl ScannerConfig {
    /// Fan-out the concurrent strategy should run with
    pub fn fan_out(&self) -> FanOut {
        match self.fan_out {
            FanOutMode::Unbounded => FanOut::Unbounded,
            FanOutMode::Pooled => FanOut::Pooled {
                threads: self.max_threads,
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads from
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults only when the file is absent.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(path)) => {
                debug!(%path, "No configuration file, using defaults");
                Ok(Config::default())
            }
            other => other,
        }
    }
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    let defaults = default_config();
    ScannerConfig {
        fan_out: FanOutMode::from_default(&defaults.scanner.fan_out),
        max_threads: defaults.scanner.max_threads,
        timing_iterations: defaults.scanner.timing_iterations,
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_config().logging.level,
    }
}

fn default_fan_out() -> FanOutMode {
    FanOutMode::from_default(&default_config().scanner.fan_out)
}

fn default_max_threads() -> usize {
    default_config().scanner.max_threads
}

fn default_timing_iterations() -> u32 {
    default_config().scanner.timing_iterations
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            logging: default_logging(),
        }
    }
}
