//! Season-level statistics rows, one per driver and per team, written with
//! the same create-or-update rule as the catalog tables.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::aggregate::{DriverTally, SeasonTally, TeamTally};
use super::standings::StandingsLookup;
use crate::storage::{
    db_timestamp, reconcile_entity, Filter, Reconcilable, Reconciled, Record, Store, Table, Value,
};

/// Statistics row for one driver in one season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverStatistics {
    pub driver_id: i64,
    pub season_year: i32,
    pub tally: DriverTally,
    pub position: i64,
    pub updated_at: DateTime<Utc>,
}

/// Statistics row for one team in one season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStatistics {
    pub team_id: i64,
    pub season_year: i32,
    pub tally: TeamTally,
    pub position: i64,
    pub updated_at: DateTime<Utc>,
}

impl Reconcilable for DriverStatistics {
    const TABLE: Table = Table::DriverStatistics;

    fn natural_key(&self) -> Filter {
        Filter::new()
            .eq("driver_id", self.driver_id)
            .eq("season_year", self.season_year)
            .is_null("race_id")
    }

    fn to_record(&self) -> Record {
        vec![
            ("driver_id", self.driver_id.into()),
            ("race_id", Value::Null),
            ("season_year", self.season_year.into()),
            ("race_wins", self.tally.race_wins.into()),
            ("sprint_wins", self.tally.sprint_wins.into()),
            ("podiums", self.tally.podiums.into()),
            ("poles", self.tally.poles.into()),
            ("fastest_laps", self.tally.fastest_laps.into()),
            ("total_points", self.tally.total_points.into()),
            ("position", self.position.into()),
            ("updated_at", db_timestamp(self.updated_at).into()),
        ]
    }

    fn label(&self) -> String {
        format!("driver {} / {}", self.driver_id, self.season_year)
    }
}

impl Reconcilable for TeamStatistics {
    const TABLE: Table = Table::TeamStatistics;

    fn natural_key(&self) -> Filter {
        Filter::new()
            .eq("team_id", self.team_id)
            .eq("season_year", self.season_year)
            .is_null("race_id")
    }

    fn to_record(&self) -> Record {
        vec![
            ("team_id", self.team_id.into()),
            ("race_id", Value::Null),
            ("season_year", self.season_year.into()),
            ("race_wins", self.tally.race_wins.into()),
            ("sprint_wins", self.tally.sprint_wins.into()),
            ("podiums", self.tally.podiums.into()),
            ("fastest_laps", self.tally.fastest_laps.into()),
            ("total_points", self.tally.total_points.into()),
            ("position", self.position.into()),
            ("updated_at", db_timestamp(self.updated_at).into()),
        ]
    }

    fn label(&self) -> String {
        format!("team {} / {}", self.team_id, self.season_year)
    }
}

/// Rows written by one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishCounts {
    pub inserted: usize,
    pub updated: usize,
}

impl PublishCounts {
    fn record(&mut self, outcome: Reconciled) {
        match outcome {
            Reconciled::Inserted(_) => self.inserted += 1,
            Reconciled::Updated => self.updated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Writes the final season tally, annotated with current standings
pub struct StatisticsPublisher {
    season: i32,
    synced_at: DateTime<Utc>,
}

impl StatisticsPublisher {
    pub fn new(season: i32, synced_at: DateTime<Utc>) -> Self {
        Self { season, synced_at }
    }

    pub fn driver_rows(&self, tally: &SeasonTally, standings: &StandingsLookup) -> Vec<DriverStatistics> {
        tally
            .drivers
            .iter()
            .map(|(&driver_id, &counters)| DriverStatistics {
                driver_id,
                season_year: self.season,
                tally: counters,
                position: standings.driver_position(driver_id),
                updated_at: self.synced_at,
            })
            .collect()
    }

    pub fn team_rows(&self, tally: &SeasonTally, standings: &StandingsLookup) -> Vec<TeamStatistics> {
        tally
            .teams
            .iter()
            .map(|(&team_id, &counters)| TeamStatistics {
                team_id,
                season_year: self.season,
                tally: counters,
                position: standings.team_position(team_id),
                updated_at: self.synced_at,
            })
            .collect()
    }

    /// Upsert one row per driver and team in the tally. The first store
    /// error aborts the publish.
    pub fn publish<S: Store>(
        &self,
        store: &S,
        tally: &SeasonTally,
        standings: &StandingsLookup,
    ) -> Result<(PublishCounts, PublishCounts)> {
        let mut drivers = PublishCounts::default();
        for row in self.driver_rows(tally, standings) {
            let outcome = reconcile_entity(store, &row)?;
            debug!(
                row = %row.label(),
                ?outcome,
                points = row.tally.total_points,
                standings_points = ?standings.driver(row.driver_id).map(|s| s.points),
                "Published driver statistics"
            );
            drivers.record(outcome);
        }

        let mut teams = PublishCounts::default();
        for row in self.team_rows(tally, standings) {
            let outcome = reconcile_entity(store, &row)?;
            debug!(
                row = %row.label(),
                ?outcome,
                points = row.tally.total_points,
                standings_points = ?standings.team(row.team_id).map(|s| s.points),
                "Published team statistics"
            );
            teams.record(outcome);
        }

        Ok((drivers, teams))
    }
}
