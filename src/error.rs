//! Error types that callers branch on.

use thiserror::Error;

/// Failure of a single provider request
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 429. Fatal for the whole run, never retried.
    #[error("rate limited by provider while fetching {resource}")]
    RateLimited { resource: String },

    #[error("provider returned status {status} for {resource}")]
    Status { resource: String, status: u16 },

    #[error("request for {resource} failed: {message}")]
    Transport { resource: String, message: String },

    #[error("could not decode {resource}: {message}")]
    Decode { resource: String, message: String },
}

/// Failure that aborts a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("rate limited by provider while fetching {resource}")]
    RateLimited { resource: String },

    #[error("store operation failed during {stage}")]
    Store {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    pub fn store(stage: &'static str, source: anyhow::Error) -> Self {
        SyncError::Store { stage, source }
    }
}
