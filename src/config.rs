//! Configuration for the season sync job.

use serde::{Deserialize, Serialize};

/// Upstream provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request pacing; the provider answers 429 above its published quota
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    /// Minimum spacing between two requests, even with tokens left
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// Page size appended to every request so rosters are never truncated
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_base_url() -> String {
    "https://api.jolpi.ca/ergast/f1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("season-sync/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_requests_per_minute() -> u32 {
    120
}

fn default_min_delay_ms() -> u64 {
    300
}

fn default_page_limit() -> u32 {
    100
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            requests_per_minute: default_requests_per_minute(),
            min_delay_ms: default_min_delay_ms(),
            page_limit: default_page_limit(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_database_path() -> String {
    "data/season.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_season")]
    pub season: i32,
}

fn default_season() -> i32 {
    2025
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            season: default_season(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("season-sync").required(false))
            // SEASON_SYNC_PROVIDER__BASE_URL, SEASON_SYNC_SYNC__SEASON, ...
            .add_source(
                config::Environment::with_prefix("SEASON_SYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.provider.base_url, "https://api.jolpi.ca/ergast/f1");
        assert_eq!(config.provider.page_limit, 100);
        assert_eq!(config.provider.min_delay_ms, 300);
        assert_eq!(config.storage.path, "data/season.db");
        assert_eq!(config.sync.season, 2025);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default()).unwrap())
            .add_source(config::File::from_str(
                "[sync]\nseason = 2024\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.sync.season, 2024);
        assert_eq!(config.provider.timeout_secs, 30);
    }
}
