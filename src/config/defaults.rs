//! Default configuration values for memwalk

use serde::{Deserialize, Serialize};

/// Default configuration file name, resolved against the working directory
pub const DEFAULT_CONFIG_PATH: &str = "memwalk.toml";

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub fan_out: String,
    pub max_threads: usize,
    pub timing_iterations: u32,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            fan_out: "unbounded".to_string(),
            max_threads: num_cpus::get().min(8),
            timing_iterations: 100,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
