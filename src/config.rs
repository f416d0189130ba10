//! Configuration loading and management
//!
//! Handles parsing of `.tapestry.toml` in the data directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::model::{DEFAULT_PERIOD_COLOR, DEFAULT_PERIOD_EMOJI};

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = ".tapestry.toml";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TAPESTRY_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Blob storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Defaults for user-created periods
    #[serde(default)]
    pub periods: PeriodsConfig,

    /// Analytics view configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long to wait for a blob lock before giving up
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodsConfig {
    /// Emoji for a new period when none is given
    #[serde(default = "default_period_emoji")]
    pub default_emoji: String,

    /// Color tag for new periods
    #[serde(default = "default_period_color")]
    pub default_color: String,
}

fn default_period_emoji() -> String {
    DEFAULT_PERIOD_EMOJI.to_string()
}

fn default_period_color() -> String {
    DEFAULT_PERIOD_COLOR.to_string()
}

impl Default for PeriodsConfig {
    fn default() -> Self {
        Self {
            default_emoji: default_period_emoji(),
            default_color: default_period_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Number of most recent day records averaged by the stats view
    #[serde(default = "default_trailing_window")]
    pub trailing_window: usize,

    /// How many emoji the stats view ranks
    #[serde(default = "default_top_emoji_limit")]
    pub top_emoji_limit: usize,
}

fn default_trailing_window() -> usize {
    7
}

fn default_top_emoji_limit() -> usize {
    5
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trailing_window: default_trailing_window(),
            top_emoji_limit: default_top_emoji_limit(),
        }
    }
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.tapestry.toml` from the data directory; defaults when absent
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            debug!(path = %config_path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::load(&config_path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.periods.default_emoji.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "periods.default_emoji cannot be empty".to_string(),
            ));
        }
        if self.periods.default_color.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "periods.default_color cannot be empty".to_string(),
            ));
        }
        if self.analytics.trailing_window == 0 {
            return Err(Error::InvalidConfig(
                "analytics.trailing_window must be > 0".to_string(),
            ));
        }
        if self.analytics.top_emoji_limit == 0 {
            return Err(Error::InvalidConfig(
                "analytics.top_emoji_limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve the data directory: explicit path, then `TAPESTRY_DIR`, then the
/// platform data dir.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(raw) = std::env::var(DATA_DIR_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    ProjectDirs::from("", "", "tapestry")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::InvalidArgument(
                "could not determine a data directory; pass --data-dir".to_string(),
            )
        })
}
