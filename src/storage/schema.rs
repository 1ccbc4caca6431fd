//! SQLite schema definitions for season data
//!
//! Tables:
//! - calendar: Race weekends, keyed by (race_name, season_year)
//! - drivers: Driver roster, keyed by driver_code
//! - teams: Constructor roster, keyed by team_name
//! - driver_statistics: Season aggregates per driver (race_id NULL)
//! - team_statistics: Season aggregates per team (race_id NULL)

use rusqlite::{Connection, Result};

/// Create all tables in the database
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS calendar (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            race_name TEXT NOT NULL,
            season_year INTEGER NOT NULL,
            round INTEGER NOT NULL,
            circuit_name TEXT,
            circuit_location TEXT,
            circuit_country TEXT,
            race_date TEXT NOT NULL,
            fp1_time TEXT,
            fp2_time TEXT,
            fp3_time TEXT,
            qualifying_time TEXT,
            sprint_qualifying_time TEXT,
            sprint_race_time TEXT,
            race_time TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(race_name, season_year)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS drivers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            driver_code TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            nationality TEXT,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_name TEXT NOT NULL UNIQUE,
            nationality TEXT,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // race_id stays NULL for season-level rows; SQLite treats NULLs as
    // distinct in UNIQUE constraints, so uniqueness is kept by the upsert
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS driver_statistics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            driver_id INTEGER NOT NULL REFERENCES drivers(id),
            race_id INTEGER REFERENCES calendar(id),
            season_year INTEGER NOT NULL,
            race_wins INTEGER NOT NULL DEFAULT 0,
            sprint_wins INTEGER NOT NULL DEFAULT 0,
            podiums INTEGER NOT NULL DEFAULT 0,
            poles INTEGER NOT NULL DEFAULT 0,
            fastest_laps INTEGER NOT NULL DEFAULT 0,
            total_points INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS team_statistics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id INTEGER NOT NULL REFERENCES teams(id),
            race_id INTEGER REFERENCES calendar(id),
            season_year INTEGER NOT NULL,
            race_wins INTEGER NOT NULL DEFAULT 0,
            sprint_wins INTEGER NOT NULL DEFAULT 0,
            podiums INTEGER NOT NULL DEFAULT 0,
            fastest_laps INTEGER NOT NULL DEFAULT 0,
            total_points INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // Natural-key lookups
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_calendar_season ON calendar(season_year, round)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_driver_statistics_key ON driver_statistics(driver_id, season_year)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_team_statistics_key ON team_statistics(team_id, season_year)",
        [],
    )?;

    Ok(())
}
