//! # Run Configuration
//!
//! One TOML file describes a run:
//!
//! ```toml
//! seed = "public-seed-2025"               # required
//! assets_file = "nft_assets.json"         # default
//! wallets_file = "eligible_wallets.json"  # default
//! output_file = "nft_allocation.json"     # default
//!
//! [rarity_bp]                             # only for unlabelled assets
//! Common = 7000
//! Rare = 2500
//! Legendary = 500
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use allotment_core::{RarityWeights, Seed};
use serde::Deserialize;
use thiserror::Error;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "allotment.toml";

/// Errors while loading the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// TOML could not be parsed into the expected structure.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// The seed is missing its value.
    #[error("seed must not be empty")]
    EmptySeed,
}

/// A parsed run configuration with every path resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllotmentConfig {
    /// The public allocation seed.
    pub seed: Seed,

    /// Asset list (JSON).
    #[serde(default = "default_assets_file")]
    pub assets_file: PathBuf,

    /// Wallet entitlements (JSON).
    #[serde(default = "default_wallets_file")]
    pub wallets_file: PathBuf,

    /// Where the allocation is written.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Rarity weights in basis points, used when assets carry no rarity.
    #[serde(default)]
    pub rarity_bp: Option<RarityWeights>,
}

fn default_assets_file() -> PathBuf {
    PathBuf::from("nft_assets.json")
}

fn default_wallets_file() -> PathBuf {
    PathBuf::from("eligible_wallets.json")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("nft_allocation.json")
}

impl AllotmentConfig {
    /// Reads and resolves a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the seed is empty.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml_str(&text, base).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses config text, resolving relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config or the seed is empty.
    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        if config.seed.as_str().is_empty() {
            return Err(ConfigError::EmptySeed);
        }

        config.assets_file = base.join(&config.assets_file);
        config.wallets_file = base.join(&config.wallets_file);
        config.output_file = base.join(&config.output_file);
        Ok(config)
    }
}
