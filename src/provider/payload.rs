//! Wire shapes of the Ergast-compatible JSON API.
//!
//! Every response is wrapped in an `MRData` envelope. Only the fields the sync
//! consumes are modeled; optional fields are `Option` so a missing value is
//! rejected at normalization rather than at decode time.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "MRData")]
    pub mr_data: T,
}

// ==================== Races ====================

#[derive(Debug, Clone, Deserialize)]
pub struct RaceTableData {
    #[serde(rename = "RaceTable")]
    pub race_table: RaceTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaceTable {
    #[serde(rename = "Races", default)]
    pub races: Vec<RawRace>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRace {
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub race_name: Option<String>,
    #[serde(rename = "Circuit", default)]
    pub circuit: Option<RawCircuit>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "FirstPractice", default)]
    pub first_practice: Option<RawSession>,
    #[serde(rename = "SecondPractice", default)]
    pub second_practice: Option<RawSession>,
    #[serde(rename = "ThirdPractice", default)]
    pub third_practice: Option<RawSession>,
    #[serde(rename = "Qualifying", default)]
    pub qualifying: Option<RawSession>,
    #[serde(rename = "SprintQualifying", default)]
    pub sprint_qualifying: Option<RawSession>,
    #[serde(rename = "SprintShootout", default)]
    pub sprint_shootout: Option<RawSession>,
    #[serde(rename = "Sprint", default)]
    pub sprint: Option<RawSession>,
    #[serde(rename = "Results", default)]
    pub results: Vec<RawResult>,
    #[serde(rename = "SprintResults", default)]
    pub sprint_results: Vec<RawResult>,
    #[serde(rename = "QualifyingResults", default)]
    pub qualifying_results: Vec<RawResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSession {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCircuit {
    #[serde(default)]
    pub circuit_name: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Race, sprint and qualifying rows share this shape; fields a session does
/// not report are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub points: Option<String>,
    #[serde(rename = "Driver", default)]
    pub driver: Option<RawDriver>,
    #[serde(rename = "Constructor", default)]
    pub constructor: Option<RawConstructor>,
    #[serde(rename = "FastestLap", default)]
    pub fastest_lap: Option<RawFastestLap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFastestLap {
    #[serde(default)]
    pub rank: Option<String>,
}

// ==================== Rosters ====================

#[derive(Debug, Clone, Deserialize)]
pub struct DriverTableData {
    #[serde(rename = "DriverTable")]
    pub driver_table: DriverTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverTable {
    #[serde(rename = "Drivers", default)]
    pub drivers: Vec<RawDriver>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDriver {
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstructorTableData {
    #[serde(rename = "ConstructorTable")]
    pub constructor_table: ConstructorTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstructorTable {
    #[serde(rename = "Constructors", default)]
    pub constructors: Vec<RawConstructor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConstructor {
    #[serde(default)]
    pub constructor_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

// ==================== Standings ====================

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsTableData {
    #[serde(rename = "StandingsTable")]
    pub standings_table: StandingsTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsTable {
    #[serde(rename = "StandingsLists", default)]
    pub standings_lists: Vec<StandingsList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsList {
    #[serde(rename = "DriverStandings", default)]
    pub driver_standings: Vec<RawStanding>,
    #[serde(rename = "ConstructorStandings", default)]
    pub constructor_standings: Vec<RawStanding>,
}

/// Driver and constructor standings differ only in which entity they carry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStanding {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub position_text: Option<String>,
    #[serde(default)]
    pub points: Option<String>,
    #[serde(rename = "Driver", default)]
    pub driver: Option<RawDriver>,
    #[serde(rename = "Constructor", default)]
    pub constructor: Option<RawConstructor>,
}
