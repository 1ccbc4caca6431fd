//! Season-sync
//!
//! Batch job that syncs one season's calendar, rosters and results from an
//! Ergast-compatible provider into SQLite and derives season statistics.

mod cli;
mod config;
mod error;
mod normalize;
mod provider;
mod stats;
mod storage;
mod sync;
mod types;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::error::SyncError;

/// Exit status when the provider rate limited the run
const RATE_LIMITED_EXIT: u8 = 2;

/// Exit status for every other fatal error
const FAILURE_EXIT: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "season_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli::run_sync(cli.season, cli.database).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Sync failed: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit status for a failed run: 2 when the provider rate limited it, 1 for
/// anything else
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SyncError>() {
        Some(SyncError::RateLimited { .. }) => RATE_LIMITED_EXIT,
        _ => FAILURE_EXIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn run_result(result: Result<(), SyncError>) -> anyhow::Result<()> {
        result?;
        Ok(())
    }

    #[test]
    fn test_rate_limit_exits_with_two() {
        let err = run_result(Err(SyncError::RateLimited {
            resource: "https://api.jolpi.ca/ergast/f1/2025/3/sprint.json".to_string(),
        }))
        .unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_rate_limit_survives_added_context() {
        let err = run_result(Err(SyncError::RateLimited {
            resource: "schedule".to_string(),
        }))
        .context("Season 2025")
        .unwrap_err();
        assert_eq!(exit_code(&err), RATE_LIMITED_EXIT);
    }

    #[test]
    fn test_store_failure_exits_with_one() {
        let err = run_result(Err(SyncError::store(
            "drivers",
            anyhow::anyhow!("disk I/O error"),
        )))
        .unwrap_err();
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_other_errors_exit_with_one() {
        let err = anyhow::anyhow!("Failed to open database");
        assert_eq!(exit_code(&err), FAILURE_EXIT);
    }
}
