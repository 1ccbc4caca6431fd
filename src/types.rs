//! Canonical records produced by normalization and consumed by the store,
//! the aggregator and the publisher.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Which session a result comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Race,
    Sprint,
    Qualifying,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Race => "race",
            ResultKind::Sprint => "sprint",
            ResultKind::Qualifying => "qualifying",
        }
    }

    /// Race and sprint results carry a team and points
    pub fn scores_points(&self) -> bool {
        matches!(self, ResultKind::Race | ResultKind::Sprint)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A race weekend on the season calendar, keyed by (race_name, season_year)
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEvent {
    pub round: u32,
    pub race_name: String,
    pub season_year: i32,
    pub circuit_name: Option<String>,
    pub circuit_location: Option<String>,
    pub circuit_country: Option<String>,
    pub race_date: NaiveDate,
    pub fp1_time: Option<DateTime<Utc>>,
    pub fp2_time: Option<DateTime<Utc>>,
    pub fp3_time: Option<DateTime<Utc>>,
    pub qualifying_time: Option<DateTime<Utc>>,
    pub sprint_qualifying_time: Option<DateTime<Utc>>,
    pub sprint_race_time: Option<DateTime<Utc>>,
    pub race_time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A driver, keyed by driver_code
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    pub driver_code: String,
    pub first_name: String,
    pub last_name: String,
    pub nationality: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A constructor, keyed by team_name
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub team_name: String,
    pub nationality: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A classified result still addressed by natural keys
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub kind: ResultKind,
    pub driver_code: String,
    /// None for qualifying
    pub team_name: Option<String>,
    pub position: i64,
    pub points: i64,
    pub fastest_lap: bool,
}

/// A result with every natural key resolved to a store id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRecord {
    pub kind: ResultKind,
    pub driver_id: i64,
    pub team_id: Option<i64>,
    pub race_id: i64,
    pub position: i64,
    pub points: i64,
    pub fastest_lap: bool,
}

impl ResultRecord {
    /// Position 0 or below means DNF / DNQ / not classified
    pub fn is_classified(&self) -> bool {
        self.position > 0
    }
}

/// Normalized season-level standing, keyed by driver code or team name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingEntry {
    pub key: String,
    pub position: i64,
    pub points: i64,
}
