//! Create-or-update of rows addressed by natural key.
//!
//! Last write wins: an existing row is fully overwritten with the candidate
//! record, so repeating a reconcile with the same record converges.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::repository::{Filter, Record, Store, Table};
use crate::types::{Driver, RaceEvent, Team};

/// Outcome of one reconcile call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Inserted(i64),
    Updated,
}

/// Update the row matching `filter` with `record`, or insert `record` when no
/// row matches. Store errors are returned to the caller untouched.
pub fn reconcile<S: Store>(
    store: &S,
    table: Table,
    filter: &Filter,
    record: &Record,
) -> Result<Reconciled> {
    match store.find_id(table, filter)? {
        Some(id) => {
            store.update(table, filter, record)?;
            debug!(table = %table, id, "Updated row");
            Ok(Reconciled::Updated)
        }
        None => {
            let id = store.insert(table, record)?;
            debug!(table = %table, id, "Inserted row");
            Ok(Reconciled::Inserted(id))
        }
    }
}

/// A canonical record that knows its table, natural key and column values
pub trait Reconcilable {
    const TABLE: Table;

    fn natural_key(&self) -> Filter;

    fn to_record(&self) -> Record;

    /// Human-readable key for logs
    fn label(&self) -> String;
}

/// Reconcile a canonical record under its own natural key
pub fn reconcile_entity<S: Store, R: Reconcilable>(store: &S, entity: &R) -> Result<Reconciled> {
    reconcile(store, R::TABLE, &entity.natural_key(), &entity.to_record())
}

/// Timestamp format used for every stored time
pub fn db_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Reconcilable for RaceEvent {
    const TABLE: Table = Table::Calendar;

    fn natural_key(&self) -> Filter {
        Filter::new()
            .eq("race_name", self.race_name.as_str())
            .eq("season_year", self.season_year)
    }

    fn to_record(&self) -> Record {
        vec![
            ("race_name", self.race_name.as_str().into()),
            ("season_year", self.season_year.into()),
            ("round", self.round.into()),
            ("circuit_name", self.circuit_name.as_deref().into()),
            ("circuit_location", self.circuit_location.as_deref().into()),
            ("circuit_country", self.circuit_country.as_deref().into()),
            ("race_date", self.race_date.format("%Y-%m-%d").to_string().into()),
            ("fp1_time", self.fp1_time.map(db_timestamp).into()),
            ("fp2_time", self.fp2_time.map(db_timestamp).into()),
            ("fp3_time", self.fp3_time.map(db_timestamp).into()),
            ("qualifying_time", self.qualifying_time.map(db_timestamp).into()),
            (
                "sprint_qualifying_time",
                self.sprint_qualifying_time.map(db_timestamp).into(),
            ),
            ("sprint_race_time", self.sprint_race_time.map(db_timestamp).into()),
            ("race_time", db_timestamp(self.race_time).into()),
            ("updated_at", db_timestamp(self.updated_at).into()),
        ]
    }

    fn label(&self) -> String {
        format!("{} {}", self.season_year, self.race_name)
    }
}

impl Reconcilable for Driver {
    const TABLE: Table = Table::Drivers;

    fn natural_key(&self) -> Filter {
        Filter::new().eq("driver_code", self.driver_code.as_str())
    }

    fn to_record(&self) -> Record {
        vec![
            ("driver_code", self.driver_code.as_str().into()),
            ("first_name", self.first_name.as_str().into()),
            ("last_name", self.last_name.as_str().into()),
            ("nationality", self.nationality.as_deref().into()),
            ("updated_at", db_timestamp(self.updated_at).into()),
        ]
    }

    fn label(&self) -> String {
        self.driver_code.clone()
    }
}

impl Reconcilable for Team {
    const TABLE: Table = Table::Teams;

    fn natural_key(&self) -> Filter {
        Filter::new().eq("team_name", self.team_name.as_str())
    }

    fn to_record(&self) -> Record {
        vec![
            ("team_name", self.team_name.as_str().into()),
            ("nationality", self.nationality.as_deref().into()),
            ("updated_at", db_timestamp(self.updated_at).into()),
        ]
    }

    fn label(&self) -> String {
        self.team_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::SqliteStore;
    use chrono::{NaiveDate, TimeZone};
    use rusqlite::types::Value as SqlValue;

    fn bahrain(qualifying_hour: u32) -> RaceEvent {
        RaceEvent {
            round: 4,
            race_name: "Bahrain Grand Prix".to_string(),
            season_year: 2025,
            circuit_name: Some("Bahrain International Circuit".to_string()),
            circuit_location: Some("Sakhir".to_string()),
            circuit_country: Some("Bahrain".to_string()),
            race_date: NaiveDate::from_ymd_opt(2025, 4, 13).unwrap(),
            fp1_time: Some(Utc.with_ymd_and_hms(2025, 4, 11, 11, 30, 0).unwrap()),
            fp2_time: Some(Utc.with_ymd_and_hms(2025, 4, 11, 15, 0, 0).unwrap()),
            fp3_time: Some(Utc.with_ymd_and_hms(2025, 4, 12, 12, 30, 0).unwrap()),
            qualifying_time: Some(Utc.with_ymd_and_hms(2025, 4, 12, qualifying_hour, 0, 0).unwrap()),
            sprint_qualifying_time: None,
            sprint_race_time: None,
            race_time: Utc.with_ymd_and_hms(2025, 4, 13, 15, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_insert_then_update_existing_event() {
        let store = SqliteStore::in_memory().unwrap();

        let first = reconcile_entity(&store, &bahrain(16)).unwrap();
        assert!(matches!(first, Reconciled::Inserted(_)));

        let second = reconcile_entity(&store, &bahrain(17)).unwrap();
        assert_eq!(second, Reconciled::Updated);
        assert_eq!(store.count(Table::Calendar).unwrap(), 1);

        let row = store
            .fetch(Table::Calendar, &bahrain(17).natural_key(), &["qualifying_time", "sprint_race_time"])
            .unwrap()
            .unwrap();
        assert_eq!(
            row,
            vec![SqlValue::Text("2025-04-12T17:00:00Z".to_string()), SqlValue::Null]
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        let team = Team {
            team_name: "Alpine F1 Team".to_string(),
            nationality: Some("French".to_string()),
            updated_at: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
        };

        reconcile_entity(&store, &team).unwrap();
        let once = store.dump(Table::Teams).unwrap();
        reconcile_entity(&store, &team).unwrap();
        reconcile_entity(&store, &team).unwrap();
        assert_eq!(store.dump(Table::Teams).unwrap(), once);
    }

    #[test]
    fn test_same_name_in_other_season_is_a_new_row() {
        let store = SqliteStore::in_memory().unwrap();
        let mut event = bahrain(16);
        reconcile_entity(&store, &event).unwrap();

        event.season_year = 2026;
        assert!(matches!(
            reconcile_entity(&store, &event).unwrap(),
            Reconciled::Inserted(_)
        ));
        assert_eq!(store.count(Table::Calendar).unwrap(), 2);
    }

    #[test]
    fn test_driver_record_overwrites_nationality() {
        let store = SqliteStore::in_memory().unwrap();
        let mut driver = Driver {
            driver_code: "ANT".to_string(),
            first_name: "Andrea Kimi".to_string(),
            last_name: "Antonelli".to_string(),
            nationality: Some("Italian".to_string()),
            updated_at: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
        };
        reconcile_entity(&store, &driver).unwrap();

        driver.nationality = None;
        reconcile_entity(&store, &driver).unwrap();

        let row = store
            .fetch(Table::Drivers, &driver.natural_key(), &["nationality"])
            .unwrap()
            .unwrap();
        assert_eq!(row, vec![SqlValue::Null]);
    }

    #[test]
    fn test_db_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2025, 3, 16, 4, 0, 0).unwrap();
        assert_eq!(db_timestamp(at), "2025-03-16T04:00:00Z");
    }
}
