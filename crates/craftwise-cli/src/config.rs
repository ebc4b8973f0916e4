//! Command line configuration.
//!
//! Settings are read from `craftwise.toml`. A missing or broken file falls
//! back to defaults; command line flags override whatever was loaded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use craftwise_resolver::{DEFAULT_BUS_CAPACITY, DEFAULT_PAGE_SIZE};

/// Configuration file name.
pub const CONFIG_FILE: &str = "craftwise.toml";

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "craftwise=info";

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: usize = 500;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File does not exist
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the file
    #[error("Failed to read config file: {0}")]
    Read(#[from] io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to write TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Command line configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding the snapshot JSON files
    pub data_dir: PathBuf,
    /// Recipes per page
    pub page_size: usize,
    /// Characters shown first when several can craft
    pub preferred_characters: Vec<String>,
    /// Favorites file
    pub favorites_path: PathBuf,
    /// Log filter directives
    pub log_filter: String,
    /// Source bus capacity
    pub channel_capacity: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            page_size: DEFAULT_PAGE_SIZE,
            preferred_characters: Vec::new(),
            favorites_path: PathBuf::from("favorites.json"),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            channel_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

impl CliConfig {
    /// Reads configuration from `path` without falling back.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.validate();
        Ok(config)
    }

    /// Resolves a load attempt, falling back to defaults on error.
    pub fn or_default(result: ConfigResult<Self>, path: &Path) -> Self {
        match result {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(ConfigError::NotFound(_)) => {
                info!("Config file not found, using defaults");
                Self::default()
            },
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            },
        }
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::or_default(Self::try_load_from(path), path)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to usable ranges.
    pub fn validate(&mut self) {
        self.page_size = self.page_size.min(MAX_PAGE_SIZE);
        self.channel_capacity = self.channel_capacity.max(1);
        if self.log_filter.trim().is_empty() {
            self.log_filter = DEFAULT_LOG_FILTER.to_string();
        }
    }
}
