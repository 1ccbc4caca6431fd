//! HTTP client for the Ergast-compatible API.

use anyhow::Context;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::payload::{
    ConstructorTableData, DriverTableData, Envelope, RaceTableData, RawConstructor, RawDriver,
    RawRace, RawStanding, StandingsList, StandingsTable, StandingsTableData,
};
use super::{
    constructor_standings_url, constructors_url, driver_standings_url, drivers_url,
    round_results_url, schedule_url, RateLimiter, SeasonProvider,
};
use crate::config::ProviderConfig;
use crate::error::FetchError;
use crate::types::ResultKind;

/// Provider client for one season. One attempt per request.
pub struct ErgastClient {
    http: Client,
    base_url: String,
    season: i32,
    page_limit: u32,
    limiter: RateLimiter,
}

impl ErgastClient {
    /// Create a client for `season` from provider configuration
    pub fn new(config: &ProviderConfig, season: i32) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent)
                .context("Invalid provider user agent")?,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            season,
            page_limit: config.page_limit,
            limiter: RateLimiter::new(
                config.requests_per_minute,
                Duration::from_millis(config.min_delay_ms),
            ),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.limiter.acquire().await;
        debug!(url = %url, "Fetching provider resource");

        let response = self
            .http
            .get(url)
            .query(&[("limit", self.page_limit)])
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                resource: url.to_string(),
                message: e.to_string(),
            })?;

        check_status(url, response.status())?;

        let body = response.text().await.map_err(|e| FetchError::Transport {
            resource: url.to_string(),
            message: e.to_string(),
        })?;

        decode(url, &body)
    }

    async fn get_races(&self, url: &str) -> Result<Vec<RawRace>, FetchError> {
        let envelope: Envelope<RaceTableData> = self.get_json(url).await?;
        Ok(envelope.mr_data.race_table.races)
    }

    async fn get_standings(&self, url: &str) -> Result<StandingsTable, FetchError> {
        let envelope: Envelope<StandingsTableData> = self.get_json(url).await?;
        Ok(envelope.mr_data.standings_table)
    }
}

/// Map an HTTP status to the fetch outcome. 429 is distinguished from every
/// other failure.
pub(crate) fn check_status(resource: &str, status: StatusCode) -> Result<(), FetchError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited {
            resource: resource.to_string(),
        });
    }
    if !status.is_success() {
        return Err(FetchError::Status {
            resource: resource.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

pub(crate) fn decode<T: DeserializeOwned>(resource: &str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        resource: resource.to_string(),
        message: e.to_string(),
    })
}

/// A season-level request returns a single list holding the current standings
fn current_standings(
    table: StandingsTable,
    pick: impl FnOnce(StandingsList) -> Vec<RawStanding>,
) -> Vec<RawStanding> {
    table
        .standings_lists
        .into_iter()
        .next()
        .map(pick)
        .unwrap_or_default()
}

impl SeasonProvider for ErgastClient {
    async fn schedule(&self) -> Result<Vec<RawRace>, FetchError> {
        self.get_races(&schedule_url(&self.base_url, self.season)).await
    }

    async fn drivers(&self) -> Result<Vec<RawDriver>, FetchError> {
        let url = drivers_url(&self.base_url, self.season);
        let envelope: Envelope<DriverTableData> = self.get_json(&url).await?;
        Ok(envelope.mr_data.driver_table.drivers)
    }

    async fn constructors(&self) -> Result<Vec<RawConstructor>, FetchError> {
        let url = constructors_url(&self.base_url, self.season);
        let envelope: Envelope<ConstructorTableData> = self.get_json(&url).await?;
        Ok(envelope.mr_data.constructor_table.constructors)
    }

    async fn round_results(
        &self,
        round: u32,
        kind: ResultKind,
    ) -> Result<Option<RawRace>, FetchError> {
        let url = round_results_url(&self.base_url, self.season, round, kind);
        Ok(self.get_races(&url).await?.into_iter().next())
    }

    async fn driver_standings(&self) -> Result<Vec<RawStanding>, FetchError> {
        let url = driver_standings_url(&self.base_url, self.season);
        let table = self.get_standings(&url).await?;
        Ok(current_standings(table, |list| list.driver_standings))
    }

    async fn constructor_standings(&self) -> Result<Vec<RawStanding>, FetchError> {
        let url = constructor_standings_url(&self.base_url, self.season);
        let table = self.get_standings(&url).await?;
        Ok(current_standings(table, |list| list.constructor_standings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_status_is_distinguished() {
        let err = check_status("races", StatusCode::TOO_MANY_REQUESTS).unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { .. }));
    }

    #[test]
    fn test_other_failures_are_not_rate_limits() {
        let err = check_status("races", StatusCode::SERVICE_UNAVAILABLE).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));

        assert!(check_status("races", StatusCode::OK).is_ok());
    }

    #[test]
    fn test_decode_failure() {
        let result: Result<Envelope<RaceTableData>, _> = decode("races", "<html>oops</html>");
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[test]
    fn test_current_standings() {
        let body = r#"{
            "MRData": {
                "StandingsTable": {
                    "StandingsLists": [{
                        "DriverStandings": [
                            {"position": "1", "positionText": "1", "points": "44", "Driver": {"code": "NOR"}},
                            {"position": "2", "positionText": "2", "points": "36", "Driver": {"code": "VER"}}
                        ]
                    }]
                }
            }
        }"#;
        let envelope: Envelope<StandingsTableData> = decode("standings", body).unwrap();
        let standings = current_standings(envelope.mr_data.standings_table, |list| {
            list.driver_standings
        });
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[1].points.as_deref(), Some("36"));
    }

    #[test]
    fn test_no_standings_yet() {
        let standings = current_standings(StandingsTable::default(), |list| list.driver_standings);
        assert!(standings.is_empty());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = ProviderConfig {
            base_url: "https://api.jolpi.ca/ergast/f1/".to_string(),
            ..ProviderConfig::default()
        };
        let client = ErgastClient::new(&config, 2025).unwrap();
        assert_eq!(client.base_url, "https://api.jolpi.ca/ergast/f1");
    }
}
