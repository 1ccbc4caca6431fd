//! Normalization of provider payloads into canonical records.
//!
//! Records missing a required field are skipped with a warning; records with
//! a non-positive position are excluded as not classified.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{debug, warn};

use crate::provider::payload::{RawConstructor, RawDriver, RawRace, RawResult, RawSession, RawStanding};
use crate::types::{Driver, RaceEvent, ResultEntry, ResultKind, StandingEntry, Team};

/// Time used when a session lists a date but no start time
const DEFAULT_SESSION_TIME: &str = "00:00:00Z";

/// Position text the provider uses for entries not yet classified
const UNCLASSIFIED_POSITION_TEXT: &str = "-";

/// Which entity a standings list ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingSide {
    Driver,
    Constructor,
}

/// Normalize the season calendar, ordered by ascending round
pub fn normalize_calendar(raw: Vec<RawRace>, season: i32, synced_at: DateTime<Utc>) -> Vec<RaceEvent> {
    let mut events: Vec<RaceEvent> = raw
        .iter()
        .filter_map(|race| normalize_event(race, season, synced_at))
        .collect();
    events.sort_by_key(|e| e.round);
    events
}

fn normalize_event(race: &RawRace, season: i32, synced_at: DateTime<Utc>) -> Option<RaceEvent> {
    let Some(race_name) = non_blank(&race.race_name) else {
        warn!(round = ?race.round, "Race name missing from calendar entry, skipping");
        return None;
    };

    let Some(round) = race.round.as_deref().and_then(|r| r.trim().parse::<u32>().ok()) else {
        warn!(race = %race_name, round = ?race.round, "Invalid round number, skipping");
        return None;
    };

    let Some(race_date) = race.date.as_deref().and_then(parse_date) else {
        warn!(race = %race_name, date = ?race.date, "Invalid race date, skipping");
        return None;
    };

    let Some(race_time) = combine(race_date, race.time.as_deref()) else {
        warn!(race = %race_name, time = ?race.time, "Invalid race start time, skipping");
        return None;
    };

    // Circuit details are descriptive only; the event is still needed to
    // address its round
    let circuit = race.circuit.as_ref();
    let location = circuit.and_then(|c| c.location.as_ref());
    let circuit_name = circuit.and_then(|c| non_blank(&c.circuit_name));
    let circuit_location = location.and_then(|l| non_blank(&l.locality));
    let circuit_country = location.and_then(|l| non_blank(&l.country));
    if circuit_name.is_none() || circuit_location.is_none() || circuit_country.is_none() {
        debug!(race = %race_name, "Circuit details incomplete");
    }

    Some(RaceEvent {
        round,
        race_name: race_name.clone(),
        season_year: season,
        circuit_name,
        circuit_location,
        circuit_country,
        race_date,
        fp1_time: session_time(&race_name, "fp1", race.first_practice.as_ref()),
        fp2_time: session_time(&race_name, "fp2", race.second_practice.as_ref()),
        fp3_time: session_time(&race_name, "fp3", race.third_practice.as_ref()),
        qualifying_time: session_time(&race_name, "qualifying", race.qualifying.as_ref()),
        // Renamed from shootout to sprint qualifying in 2024
        sprint_qualifying_time: session_time(
            &race_name,
            "sprint qualifying",
            race.sprint_qualifying.as_ref().or(race.sprint_shootout.as_ref()),
        ),
        sprint_race_time: session_time(&race_name, "sprint", race.sprint.as_ref()),
        race_time,
        updated_at: synced_at,
    })
}

/// Normalize the driver roster; drivers without a code cannot be addressed
pub fn normalize_drivers(raw: Vec<RawDriver>, synced_at: DateTime<Utc>) -> Vec<Driver> {
    raw.into_iter()
        .filter_map(|driver| {
            let Some(driver_code) = non_blank(&driver.code) else {
                warn!(driver_id = ?driver.driver_id, "Driver without code, skipping");
                return None;
            };
            let (Some(first_name), Some(last_name)) =
                (non_blank(&driver.given_name), non_blank(&driver.family_name))
            else {
                warn!(driver = %driver_code, "Driver name missing, skipping");
                return None;
            };

            Some(Driver {
                driver_code,
                first_name,
                last_name,
                nationality: non_blank(&driver.nationality),
                updated_at: synced_at,
            })
        })
        .collect()
}

/// Normalize the constructor roster
pub fn normalize_teams(raw: Vec<RawConstructor>, synced_at: DateTime<Utc>) -> Vec<Team> {
    raw.into_iter()
        .filter_map(|constructor| {
            let Some(team_name) = non_blank(&constructor.name) else {
                warn!(constructor_id = ?constructor.constructor_id, "Constructor without name, skipping");
                return None;
            };

            Some(Team {
                team_name,
                nationality: non_blank(&constructor.nationality),
                updated_at: synced_at,
            })
        })
        .collect()
}

/// Normalize one session's results for a round.
///
/// Qualifying entries never carry a team, points or a fastest lap; sprint
/// entries never carry a fastest lap.
pub fn normalize_results(race: &RawRace, kind: ResultKind) -> Vec<ResultEntry> {
    let rows = match kind {
        ResultKind::Race => &race.results,
        ResultKind::Sprint => &race.sprint_results,
        ResultKind::Qualifying => &race.qualifying_results,
    };

    rows.iter()
        .filter_map(|row| normalize_result(row, kind))
        .collect()
}

fn normalize_result(row: &RawResult, kind: ResultKind) -> Option<ResultEntry> {
    let Some(driver_code) = row.driver.as_ref().and_then(|d| non_blank(&d.code)) else {
        warn!(kind = %kind, "Result without driver code, skipping");
        return None;
    };

    let position = parse_position(row.position.as_deref());
    if position <= 0 {
        debug!(kind = %kind, driver = %driver_code, position = ?row.position, "Not classified, excluding");
        return None;
    }

    if !kind.scores_points() {
        return Some(ResultEntry {
            kind,
            driver_code,
            team_name: None,
            position,
            points: 0,
            fastest_lap: false,
        });
    }

    let Some(team_name) = row.constructor.as_ref().and_then(|c| non_blank(&c.name)) else {
        warn!(kind = %kind, driver = %driver_code, "Result without constructor, skipping");
        return None;
    };

    let Some(points) = parse_points(row.points.as_deref()) else {
        warn!(kind = %kind, driver = %driver_code, points = ?row.points, "Invalid points, skipping");
        return None;
    };

    // String identity on the rank; "01" or " 1" are not a fastest lap
    let fastest_lap = kind == ResultKind::Race
        && row
            .fastest_lap
            .as_ref()
            .and_then(|f| f.rank.as_deref())
            == Some("1");

    Some(ResultEntry {
        kind,
        driver_code,
        team_name: Some(team_name),
        position,
        points,
        fastest_lap,
    })
}

/// Normalize a standings list into (natural key, position, points) entries
pub fn normalize_standings(raw: &[RawStanding], side: StandingSide) -> Vec<StandingEntry> {
    raw.iter()
        .filter_map(|standing| {
            let key = match side {
                StandingSide::Driver => standing.driver.as_ref().and_then(|d| non_blank(&d.code)),
                StandingSide::Constructor => {
                    standing.constructor.as_ref().and_then(|c| non_blank(&c.name))
                }
            };
            let Some(key) = key else {
                warn!(side = ?side, "Standing without entity key, skipping");
                return None;
            };

            if standing.position_text.as_deref() == Some(UNCLASSIFIED_POSITION_TEXT) {
                debug!(side = ?side, key = %key, "No standings position yet, skipping");
                return None;
            }

            let position = parse_position(standing.position.as_deref());
            if position <= 0 {
                warn!(side = ?side, key = %key, position = ?standing.position, "Invalid standings position, skipping");
                return None;
            }

            Some(StandingEntry {
                key,
                position,
                points: parse_points(standing.points.as_deref()).unwrap_or(0),
            })
        })
        .collect()
}

/// Session start, present only when the provider lists a date for it.
/// A listed session whose date or time does not parse is dropped with a
/// warning.
fn session_time(race: &str, name: &str, session: Option<&RawSession>) -> Option<DateTime<Utc>> {
    let session = session?;
    let raw_date = session.date.as_deref()?;
    let start = parse_date(raw_date).and_then(|date| combine(date, session.time.as_deref()));
    if start.is_none() {
        warn!(
            race = %race,
            session = name,
            date = %raw_date,
            time = ?session.time,
            "Invalid session start, leaving it empty"
        );
    }
    start
}

fn combine(date: NaiveDate, time: Option<&str>) -> Option<DateTime<Utc>> {
    let time = time.unwrap_or(DEFAULT_SESSION_TIME);
    let time = NaiveTime::parse_from_str(time.trim().trim_end_matches('Z'), "%H:%M:%S").ok()?;
    Some(date.and_time(time).and_utc())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Missing or unparseable positions count as not classified
fn parse_position(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Decimal points truncated toward zero; missing points are zero
fn parse_points(value: Option<&str>) -> Option<i64> {
    let Some(value) = value else {
        return Some(0);
    };
    let points: f64 = value.trim().parse().ok()?;
    points.is_finite().then(|| points.trunc() as i64)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
