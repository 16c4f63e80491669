//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ecostats.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".ecostats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Retry settings for contributor statistics.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path to the ecosystem manifest.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("stacks.json")
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Page size for organization listings (GitHub caps this at 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            per_page: default_per_page(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("ecostats/{}", env!("CARGO_PKG_VERSION"))
}

/// Retry behaviour for rate-limited and pending statistics requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Wait used when the reported rate-limit reset is already in the past.
    #[serde(default = "default_min_backoff")]
    pub min_backoff_seconds: u64,

    /// Wait between attempts while GitHub computes statistics.
    #[serde(default = "default_pending_delay")]
    pub pending_delay_seconds: u64,

    /// Give up on a repository after this many attempts (unbounded if unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Cap on a single rate-limit wait (uncapped if unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_seconds: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_backoff_seconds: default_min_backoff(),
            pending_delay_seconds: default_pending_delay(),
            max_attempts: None,
            max_wait_seconds: None,
        }
    }
}

fn default_min_backoff() -> u64 {
    5
}

fn default_pending_delay() -> u64 {
    1
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only arguments the user actually supplied override file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref file) = args.file {
            self.general.manifest = file.clone();
        }

        if let Some(ref api_url) = args.api_url {
            self.github.api_url = api_url.clone();
        }

        if let Some(max_attempts) = args.max_attempts {
            self.retry.max_attempts = Some(max_attempts);
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
