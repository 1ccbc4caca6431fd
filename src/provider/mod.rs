//! Read-only season data provider (Ergast-compatible API, e.g. Jolpica).
//!
//! Provides the provider trait consumed by the sync, its HTTP implementation,
//! wire payloads and request pacing.

pub mod client;
pub mod payload;
pub mod rate_limiter;

pub use client::ErgastClient;
pub use rate_limiter::RateLimiter;

use crate::error::FetchError;
use crate::types::ResultKind;
use payload::{RawConstructor, RawDriver, RawRace, RawStanding};

/// Resources the sync reads for one season
#[allow(async_fn_in_trait)]
pub trait SeasonProvider {
    /// Season calendar
    async fn schedule(&self) -> Result<Vec<RawRace>, FetchError>;

    /// Drivers entered in the season
    async fn drivers(&self) -> Result<Vec<RawDriver>, FetchError>;

    /// Constructors entered in the season
    async fn constructors(&self) -> Result<Vec<RawConstructor>, FetchError>;

    /// Results of one session of a round; `None` when the round has no data yet
    async fn round_results(
        &self,
        round: u32,
        kind: ResultKind,
    ) -> Result<Option<RawRace>, FetchError>;

    /// Current driver standings
    async fn driver_standings(&self) -> Result<Vec<RawStanding>, FetchError>;

    /// Current constructor standings
    async fn constructor_standings(&self) -> Result<Vec<RawStanding>, FetchError>;
}

/// Build season calendar URL
/// URL: {base}/{season}/races.json
pub fn schedule_url(base_url: &str, season: i32) -> String {
    format!("{}/{}/races.json", base_url, season)
}

/// Build driver roster URL
pub fn drivers_url(base_url: &str, season: i32) -> String {
    format!("{}/{}/drivers.json", base_url, season)
}

/// Build constructor roster URL
pub fn constructors_url(base_url: &str, season: i32) -> String {
    format!("{}/{}/constructors.json", base_url, season)
}

/// Build per-round result URL
/// URL: {base}/{season}/{round}/{results|sprint|qualifying}.json
pub fn round_results_url(base_url: &str, season: i32, round: u32, kind: ResultKind) -> String {
    let resource = match kind {
        ResultKind::Race => "results",
        ResultKind::Sprint => "sprint",
        ResultKind::Qualifying => "qualifying",
    };
    format!("{}/{}/{}/{}.json", base_url, season, round, resource)
}

/// Build driver standings URL
pub fn driver_standings_url(base_url: &str, season: i32) -> String {
    format!("{}/{}/driverStandings.json", base_url, season)
}

/// Build constructor standings URL
pub fn constructor_standings_url(base_url: &str, season: i32) -> String {
    format!("{}/{}/constructorStandings.json", base_url, season)
}
