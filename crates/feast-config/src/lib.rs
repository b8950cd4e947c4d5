//! FEAST adapter configuration
//!
//! Locates and merges the settings the runtime needs before it can talk to the
//! native feature-selection library:
//! - Global user configuration (~/.feast/config.toml)
//! - Project configuration (feast.toml)
//! - Environment variables (FEAST_*)
//!
//! # Configuration Hierarchy
//!
//! Later sources override earlier ones:
//! 1. Global config (~/.feast/config.toml)
//! 2. Project config (./feast.toml, searched upwards)
//! 3. Environment variables (FEAST_LIBRARY, FEAST_LIBRARY_PATH, ...)
//!
//! # Example
//!
//! ```no_run
//! use feast_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("native library: {}", config.library_name());
//! ```

pub mod loader;
pub mod settings;

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

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{Config, ConfigLoader};
pub use settings::{FeastSettings, LibrarySettings, SelectionSettings, DEFAULT_LIBRARY_NAME};
