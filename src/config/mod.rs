//! Configuration module for memwalk
//!
//! Provides configuration loading, validation, and default settings.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults, DEFAULT_CONFIG_PATH};
pub use loader::{ConfigLoader, FanOutMode, LoggingConfig, ScannerConfig};
pub use validator::{validate_config, ConfigValidator, VALID_LOG_LEVELS};

// Re-export the main configuration structure
pub use loader::Config;

// Configuration-related error type
pub use loader::ConfigError;
