//! One season sync run.
//!
//! Stages, in order: calendar, drivers, teams, per-round results, standings,
//! statistics. A rate limit on any fetch or a failed store write aborts the
//! run; any other fetch failure leaves that fetch empty and the run goes on.
//! Rows written before an abort stay written.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::error::{FetchError, SyncError};
use crate::normalize::{
    normalize_calendar, normalize_drivers, normalize_results, normalize_standings,
    normalize_teams, StandingSide,
};
use crate::provider::SeasonProvider;
use crate::stats::{ResultAggregator, RoundResults, StandingsLookup, StatisticsPublisher};
use crate::storage::{reconcile_entity, EntityKind, EntityResolver, Reconcilable, Store};
use crate::types::{RaceEvent, ResultEntry, ResultKind, ResultRecord};

/// Counts logged at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub events: usize,
    pub drivers: usize,
    pub teams: usize,
    pub rounds: usize,
    pub results_applied: usize,
    pub results_skipped: usize,
    pub driver_statistics: usize,
    pub team_statistics: usize,
    pub lookups: usize,
}

/// Sync orchestrator for one season
pub struct SeasonSync<'a, P: SeasonProvider, S: Store> {
    provider: &'a P,
    store: &'a S,
    season: i32,
    synced_at: DateTime<Utc>,
}

impl<'a, P: SeasonProvider, S: Store> SeasonSync<'a, P, S> {
    /// `synced_at` is stamped on every row written by this run
    pub fn new(provider: &'a P, store: &'a S, season: i32, synced_at: DateTime<Utc>) -> Self {
        Self {
            provider,
            store,
            season,
            synced_at,
        }
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        info!(season = self.season, "Starting season sync");
        let mut report = SyncReport::default();

        let events = self.sync_calendar(&mut report).await?;
        self.sync_drivers(&mut report).await?;
        self.sync_teams(&mut report).await?;

        let mut resolver = EntityResolver::new(self.store, self.season);
        let mut seen = HashSet::new();
        let mut rounds = Vec::with_capacity(events.len());
        for event in &events {
            // Results are addressed by round; a second event on the same round
            // would fold that round twice
            if !seen.insert(event.round) {
                warn!(round = event.round, race = %event.race_name, "Round already collected, skipping");
                continue;
            }
            rounds.push(self.collect_round(&mut resolver, event, &mut report).await?);
        }
        report.rounds = rounds.len();
        let tally = ResultAggregator::fold_season(rounds);

        let standings = self.resolve_standings(&mut resolver).await?;
        let publisher = StatisticsPublisher::new(self.season, self.synced_at);
        let (drivers, teams) = publisher
            .publish(self.store, &tally, &standings)
            .map_err(|e| SyncError::store("statistics", e))?;
        report.driver_statistics = drivers.total();
        report.team_statistics = teams.total();
        report.lookups = resolver.lookups();

        info!(
            season = self.season,
            events = report.events,
            drivers = report.drivers,
            teams = report.teams,
            rounds = report.rounds,
            results_applied = report.results_applied,
            results_skipped = report.results_skipped,
            driver_statistics = report.driver_statistics,
            team_statistics = report.team_statistics,
            lookups = report.lookups,
            "Season sync complete"
        );
        Ok(report)
    }

    async fn sync_calendar(&self, report: &mut SyncReport) -> Result<Vec<RaceEvent>, SyncError> {
        let raw = fetch_or_empty("schedule", self.provider.schedule()).await?;
        let events = normalize_calendar(raw, self.season, self.synced_at);
        report.events = self.reconcile_all("calendar", &events)?;
        info!(events = report.events, "Calendar synced");
        Ok(events)
    }

    async fn sync_drivers(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        let raw = fetch_or_empty("drivers", self.provider.drivers()).await?;
        let drivers = normalize_drivers(raw, self.synced_at);
        report.drivers = self.reconcile_all("drivers", &drivers)?;
        info!(drivers = report.drivers, "Drivers synced");
        Ok(())
    }

    async fn sync_teams(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        let raw = fetch_or_empty("constructors", self.provider.constructors()).await?;
        let teams = normalize_teams(raw, self.synced_at);
        report.teams = self.reconcile_all("teams", &teams)?;
        info!(teams = report.teams, "Teams synced");
        Ok(())
    }

    fn reconcile_all<R: Reconcilable>(&self, stage: &'static str, rows: &[R]) -> Result<usize, SyncError> {
        for row in rows {
            reconcile_entity(self.store, row).map_err(|e| {
                warn!(stage, row = %row.label(), error = %e, "Store write failed, aborting");
                SyncError::store(stage, e)
            })?;
        }
        Ok(rows.len())
    }

    /// Fetch and resolve race, sprint and qualifying results of one event
    async fn collect_round(
        &self,
        resolver: &mut EntityResolver<'_, S>,
        event: &RaceEvent,
        report: &mut SyncReport,
    ) -> Result<RoundResults, SyncError> {
        let mut round = RoundResults {
            round: event.round,
            ..Default::default()
        };

        let Some(race_id) = resolver
            .resolve(EntityKind::Event, &event.race_name)
            .map_err(|e| SyncError::store("results", e))?
        else {
            warn!(race = %event.race_name, "Event not stored, skipping round");
            return Ok(round);
        };

        for kind in [ResultKind::Race, ResultKind::Sprint, ResultKind::Qualifying] {
            let resource = format!("{} round {}", kind, event.round);
            let fetched = fetch_or_empty(&resource, self.provider.round_results(event.round, kind)).await?;
            let Some(raw) = fetched else {
                debug!(round = event.round, kind = %kind, "No results yet");
                continue;
            };

            let mut records = Vec::new();
            for entry in normalize_results(&raw, kind) {
                match resolve_entry(resolver, &entry, race_id).map_err(|e| SyncError::store("results", e))? {
                    Some(record) => records.push(record),
                    None => report.results_skipped += 1,
                }
            }
            report.results_applied += records.len();

            match kind {
                ResultKind::Race => round.race = records,
                ResultKind::Sprint => round.sprint = records,
                ResultKind::Qualifying => round.qualifying = records,
            }
        }

        debug!(
            round = event.round,
            race = round.race.len(),
            sprint = round.sprint.len(),
            qualifying = round.qualifying.len(),
            "Round collected"
        );
        Ok(round)
    }

    /// Standings are fetched once per run and shared by both publishes
    async fn resolve_standings(
        &self,
        resolver: &mut EntityResolver<'_, S>,
    ) -> Result<StandingsLookup, SyncError> {
        let drivers = fetch_or_empty("driver standings", self.provider.driver_standings()).await?;
        let teams =
            fetch_or_empty("constructor standings", self.provider.constructor_standings()).await?;

        StandingsLookup::resolve(
            resolver,
            &normalize_standings(&drivers, StandingSide::Driver),
            &normalize_standings(&teams, StandingSide::Constructor),
        )
        .map_err(|e| SyncError::store("standings", e))
    }
}

/// Resolve the natural keys of one entry. `None` when the driver or team is
/// not stored; the entry is then dropped.
fn resolve_entry<S: Store>(
    resolver: &mut EntityResolver<'_, S>,
    entry: &ResultEntry,
    race_id: i64,
) -> anyhow::Result<Option<ResultRecord>> {
    let Some(driver_id) = resolver.resolve(EntityKind::Driver, &entry.driver_code)? else {
        warn!(kind = %entry.kind, driver = %entry.driver_code, "Unknown driver, skipping result");
        return Ok(None);
    };

    let team_id = match &entry.team_name {
        Some(name) => match resolver.resolve(EntityKind::Team, name)? {
            Some(id) => Some(id),
            None => {
                warn!(kind = %entry.kind, team = %name, "Unknown team, skipping result");
                return Ok(None);
            }
        },
        None => None,
    };

    Ok(Some(ResultRecord {
        kind: entry.kind,
        driver_id,
        team_id,
        race_id,
        position: entry.position,
        points: entry.points,
        fastest_lap: entry.fastest_lap,
    }))
}

/// Await a fetch; a rate limit aborts, anything else degrades to no data
async fn fetch_or_empty<T: Default>(
    resource: &str,
    fetch: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, SyncError> {
    match fetch.await {
        Ok(value) => Ok(value),
        Err(FetchError::RateLimited { resource: url }) => {
            warn!(resource, url = %url, "Rate limited by provider, aborting run");
            Err(SyncError::RateLimited { resource: url })
        }
        Err(e) => {
            warn!(resource, error = %e, "Fetch failed, continuing without data");
            Ok(T::default())
        }
    }
}
