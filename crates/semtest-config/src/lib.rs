//! semtest configuration
//!
//! Provides configuration for suite runs:
//! - Suite configuration file (semtest.toml)
//! - Environment variable overrides (SEMTEST_*)
//! - Validation of the merged result
//!
//! # Configuration Hierarchy
//!
//! Configuration is merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Suite config (semtest.toml, found by walking up from the suite directory)
//! 3. Environment variables (SEMTEST_*, NO_COLOR)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use semtest_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
//! let settings = config.settings();
//! ```

pub mod loader;
pub mod suite;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Name of the suite configuration file
pub const CONFIG_FILE_NAME: &str = "semtest.toml";

pub use loader::{Config, ConfigLoader, Settings};
pub use suite::SuiteConfig;
