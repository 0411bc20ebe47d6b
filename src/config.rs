use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::version::lifecycle::SupportLifecycleRecord;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default lifetime of cached marketplace and version lookups (1 hour)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Timeout for a single upstream request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Upstream defaults
// =============================================================================

/// Records requested per marketplace page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Default base URL for the package marketplace API
pub const DEFAULT_MARKETPLACE_URL: &str = "https://api.marketplace.umbraco.com/api/v1.0";

/// Default base URL for the flat version index
pub const DEFAULT_FLAT_INDEX_URL: &str = "https://api.nuget.org/v3-flatcontainer";

/// Package whose published versions feed the LTS resolver
pub const DEFAULT_TRACKED_PACKAGE: &str = "Umbraco.Templates";

/// User agent sent with every upstream request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub registries: RegistriesConfig,
    pub lts: LtsConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file. Missing sections use defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Lifetime of a cached lookup in seconds
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Upstream endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistriesConfig {
    pub marketplace_url: String,
    pub flat_index_url: String,
}

impl Default for RegistriesConfig {
    fn default() -> Self {
        Self {
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            flat_index_url: DEFAULT_FLAT_INDEX_URL.to_string(),
        }
    }
}

/// Inputs of the LTS resolver
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LtsConfig {
    pub tracked_package: String,
    /// Support lifecycle table, expected in ascending major-version order
    pub lifecycle: Vec<SupportLifecycleRecord>,
}

impl Default for LtsConfig {
    fn default() -> Self {
        Self {
            tracked_package: DEFAULT_TRACKED_PACKAGE.to_string(),
            lifecycle: Vec::new(),
        }
    }
}

/// Returns the path to the data directory.
/// Uses $XDG_DATA_HOME/package-script-writer if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/package-script-writer,
/// or ./package-script-writer if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("package-script-writer.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("package-script-writer")
}
