use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://anisongdb.com/api";

/// Configuration for songlink.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SONGLINK_* prefix)
/// 3. Config file (~/.config/songlink/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: SONGLINK_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/songlink/songlink.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Base URL of the AnisongDB API, without a trailing slash.
    #[serde(default = "default_api_base")]
    pub anisong_api_base: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Retries for transient catalog failures (server errors, rate limits).
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            anisong_api_base: default_api_base(),
            request_timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("songlink");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, overriding the database path when `--db` was given.
    pub fn load_with_db_path(db_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load()?;
        if let Some(db_path) = db_path {
            config.database_path = db_path;
        }
        Ok(config)
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("songlink")
        .join("songlink.db")
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_max_retries() -> usize {
    3
}

const fn default_requests_per_second() -> u32 {
    2
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/songlink/config.toml
/// - macOS: ~/Library/Application Support/songlink/config.toml
/// - Windows: %APPDATA%\songlink\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("songlink")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Songlink Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SONGLINK_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database
#
# Can also be set via:
# - CLI: songlink --db /custom/path.db status
# - Environment: SONGLINK_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/songlink.db"

# AnisongDB API base URL
#anisong_api_base = "https://anisongdb.com/api"

# Seconds before a catalog request is abandoned
#request_timeout_secs = 30

# Retries for transient catalog failures (5xx, 429, timeouts)
#max_retries = 3

# Catalog requests per second
#requests_per_second = 2
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database_path.ends_with("songlink/songlink.db"));
        assert_eq!(config.anisong_api_base, DEFAULT_API_BASE);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(Some(custom_path.clone())).unwrap();
        assert_eq!(config.database_path, custom_path);
    }

    #[test]
    fn test_example_config_is_all_comments() {
        assert!(example_config()
            .lines()
            .all(|line| line.is_empty() || line.starts_with('#')));
    }
}
