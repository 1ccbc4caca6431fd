//! CLI for season-sync.
//!
//! A single command: sync one season from the provider into the local store.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::provider::ErgastClient;
use crate::storage::SqliteStore;
use crate::sync::SeasonSync;

#[derive(Parser)]
#[command(name = "season-sync")]
#[command(version, about = "Sync a motorsport season and derive season statistics", long_about = None)]
pub struct Cli {
    /// Season year override
    #[arg(short, long)]
    pub season: Option<i32>,

    /// Database path override
    #[arg(short, long, value_name = "FILE")]
    pub database: Option<PathBuf>,
}

/// Run one sync with configuration and CLI overrides applied
pub async fn run_sync(season: Option<i32>, database: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;

    if let Some(s) = season {
        config.sync.season = s;
    }
    if let Some(path) = database {
        config.storage.path = path.to_string_lossy().into_owned();
    }

    tracing::info!("Configuration loaded");
    tracing::info!("Provider: {}", config.provider.base_url);
    tracing::info!("Database: {}", config.storage.path);

    let store = SqliteStore::new(&PathBuf::from(&config.storage.path))
        .with_context(|| format!("Failed to open store at {}", config.storage.path))?;
    let client = ErgastClient::new(&config.provider, config.sync.season)?;

    let sync = SeasonSync::new(&client, &store, config.sync.season, Utc::now());
    sync.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_are_optional() {
        let cli = Cli::try_parse_from(["season-sync"]).unwrap();
        assert!(cli.database.is_none());

        let cli = Cli::try_parse_from(["season-sync", "--season", "2024", "-d", "/tmp/f1.db"]).unwrap();
        assert_eq!(cli.season, Some(2024));
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/f1.db")));
    }
}
