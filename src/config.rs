//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_DATA_PREFIX, DEFAULT_MIN_PER_BUCKET, DEFAULT_PRICE_CAP,
    DEFAULT_PRICE_STEP,
};
use crate::pricing::PriceBuckets;

/// Blob store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the filesystem store (e.g., "/`srv/shade-data`")
    pub root: Option<PathBuf>,
}

/// Price tier settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Width of one price tier
    pub step: u32,
    /// Prices above this share the top tier
    pub cap: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_PRICE_STEP,
            cap: DEFAULT_PRICE_CAP,
        }
    }
}

/// Backfill settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    /// Minimum population of each depth list after backfill
    pub min_per_bucket: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            min_per_bucket: DEFAULT_MIN_PER_BUCKET,
        }
    }
}

/// Where taxonomy documents live inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Key prefix of `<prefix>/<category>/categorised_LMD.json`
    pub data_prefix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Blob store location
    pub store: StoreConfig,
    /// Price tiers
    pub pricing: PricingConfig,
    /// Backfill
    pub backfill: BackfillConfig,
    /// Document keys
    pub source: SourceConfig,
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the configuration directory path.
    ///
    /// - Linux: `~/.config/ShadeCatalog/`
    /// - macOS: `~/Library/Application Support/ShadeCatalog/`
    /// - Windows: `%APPDATA%\ShadeCatalog\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the platform config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the platform config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp config file to: {}", path.display())
        })?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - `pricing.step` is positive and not above `pricing.cap`
    /// - `source.data_prefix` is a relative key prefix
    pub fn validate(&self) -> Result<()> {
        if self.pricing.step == 0 {
            anyhow::bail!("pricing.step must be greater than 0");
        }
        if self.pricing.step > self.pricing.cap {
            anyhow::bail!(
                "pricing.step ({}) must not exceed pricing.cap ({})",
                self.pricing.step,
                self.pricing.cap
            );
        }

        let prefix = self.source.data_prefix.trim_matches('/');
        if prefix.is_empty() || prefix.split('/').any(|s| s.is_empty() || s == "..") {
            anyhow::bail!(
                "source.data_prefix '{}' must be a relative key prefix",
                self.source.data_prefix
            );
        }

        Ok(())
    }

    /// Store root: the configured directory, or `store/` under the config directory.
    pub fn store_root(&self) -> Result<PathBuf> {
        match &self.store.root {
            Some(root) => Ok(root.clone()),
            None => Ok(Self::config_dir()?.join("store")),
        }
    }

    /// Price tier settings.
    #[must_use]
    pub const fn price_buckets(&self) -> PriceBuckets {
        PriceBuckets::new(self.pricing.step, self.pricing.cap)
    }
}
