//! Store access: the minimal key-filtered interface the sync needs, and its
//! SQLite implementation.

use anyhow::{Context, Result};
use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};
use std::fmt;
use std::path::Path;

use super::schema::create_tables;

/// Tables written by the sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Calendar,
    Drivers,
    Teams,
    DriverStatistics,
    TeamStatistics,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Calendar => "calendar",
            Table::Drivers => "drivers",
            Table::Teams => "teams",
            Table::DriverStatistics => "driver_statistics",
            Table::TeamStatistics => "team_statistics",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::Text(v) => ToSqlOutput::Owned(SqlValue::Text(v.clone())),
        })
    }
}

/// Full set of column values written for one row
pub type Record = Vec<(&'static str, Value)>;

/// Conjunction of exact-equality clauses; `Value::Null` matches `IS NULL`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<(&'static str, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.clauses.push((column, value.into()));
        self
    }

    pub fn is_null(self, column: &'static str) -> Self {
        self.eq(column, Value::Null)
    }

    /// WHERE clause with numbered placeholders starting after `offset`, and
    /// the values bound to them
    fn to_sql(&self, offset: usize) -> (String, Vec<&Value>) {
        let mut parts = Vec::with_capacity(self.clauses.len());
        let mut params = Vec::new();
        for (column, value) in &self.clauses {
            if *value == Value::Null {
                parts.push(format!("{} IS NULL", column));
            } else {
                params.push(value);
                parts.push(format!("{} = ?{}", column, offset + params.len()));
            }
        }
        if parts.is_empty() {
            return ("1 = 1".to_string(), params);
        }
        (parts.join(" AND "), params)
    }
}

/// Store operations the sync relies on
pub trait Store {
    /// Id of the first row matching `filter`, if any
    fn find_id(&self, table: Table, filter: &Filter) -> Result<Option<i64>>;

    /// Insert `record`, returning the new row id
    fn insert(&self, table: Table, record: &Record) -> Result<i64>;

    /// Overwrite every column in `record` on rows matching `filter`,
    /// returning the number of rows changed
    fn update(&self, table: Table, filter: &Filter, record: &Record) -> Result<usize>;
}

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store, initializing the database if needed
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(db_path).context("Failed to open database")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        create_tables(&conn).context("Failed to create tables")?;

        Ok(Self { conn })
    }

    /// Create an in-memory store (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Row count of a table
    #[cfg(test)]
    pub fn count(&self, table: Table) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.as_str()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Named columns of the first row matching `filter`
    #[cfg(test)]
    pub fn fetch(
        &self,
        table: Table,
        filter: &Filter,
        columns: &[&str],
    ) -> Result<Option<Vec<SqlValue>>> {
        let (clause, params) = filter.to_sql(0);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY id LIMIT 1",
            columns.join(", "),
            table.as_str(),
            clause
        );

        let row = self
            .conn
            .query_row(&sql, params_from_iter(params), |row| {
                (0..columns.len())
                    .map(|i| row.get::<_, SqlValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .optional()?;
        Ok(row)
    }

    /// Every row of a table ordered by id (for comparisons in tests)
    #[cfg(test)]
    pub fn dump(&self, table: Table) -> Result<Vec<Vec<SqlValue>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} ORDER BY id", table.as_str()))?;
        let width = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, SqlValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl Store for SqliteStore {
    fn find_id(&self, table: Table, filter: &Filter) -> Result<Option<i64>> {
        let (clause, params) = filter.to_sql(0);
        let sql = format!(
            "SELECT id FROM {} WHERE {} ORDER BY id LIMIT 1",
            table.as_str(),
            clause
        );

        let id = self
            .conn
            .query_row(&sql, params_from_iter(params), |row| row.get(0))
            .optional()
            .with_context(|| format!("Lookup in {} failed", table))?;
        Ok(id)
    }

    fn insert(&self, table: Table, record: &Record) -> Result<i64> {
        let columns: Vec<&str> = record.iter().map(|(c, _)| *c).collect();
        let placeholders: Vec<String> = (1..=record.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.as_str(),
            columns.join(", "),
            placeholders.join(", ")
        );

        self.conn
            .execute(&sql, params_from_iter(record.iter().map(|(_, v)| v)))
            .with_context(|| format!("Insert into {} failed", table))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, table: Table, filter: &Filter, record: &Record) -> Result<usize> {
        let assignments: Vec<String> = record
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let (clause, filter_params) = filter.to_sql(record.len());
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table.as_str(),
            assignments.join(", "),
            clause
        );

        let params = record.iter().map(|(_, v)| v).chain(filter_params);
        let changed = self
            .conn
            .execute(&sql, params_from_iter(params))
            .with_context(|| format!("Update of {} failed", table))?;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, nationality: Option<&str>) -> Record {
        vec![
            ("team_name", name.into()),
            ("nationality", nationality.into()),
            ("updated_at", "2025-04-01T00:00:00Z".into()),
        ]
    }

    #[test]
    fn test_filter_sql() {
        let filter = Filter::new()
            .eq("driver_id", 7i64)
            .eq("season_year", 2025i32)
            .is_null("race_id");

        let (clause, params) = filter.to_sql(3);
        assert_eq!(clause, "driver_id = ?4 AND season_year = ?5 AND race_id IS NULL");
        assert_eq!(params, vec![&Value::Integer(7), &Value::Integer(2025)]);
    }

    #[test]
    fn test_insert_and_find() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.insert(Table::Teams, &team("McLaren", Some("British"))).unwrap();

        let found = store
            .find_id(Table::Teams, &Filter::new().eq("team_name", "McLaren"))
            .unwrap();
        assert_eq!(found, Some(id));

        let missing = store
            .find_id(Table::Teams, &Filter::new().eq("team_name", "Brawn"))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_update_overwrites_and_nulls() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(Table::Teams, &team("Ferrari", Some("Italian"))).unwrap();

        let filter = Filter::new().eq("team_name", "Ferrari");
        let changed = store.update(Table::Teams, &filter, &team("Ferrari", None)).unwrap();
        assert_eq!(changed, 1);

        let row = store
            .fetch(Table::Teams, &filter, &["nationality"])
            .unwrap()
            .unwrap();
        assert_eq!(row, vec![SqlValue::Null]);
    }

    #[test]
    fn test_null_filter_matches_only_null_rows() {
        let store = SqliteStore::in_memory().unwrap();
        let team_id = store.insert(Table::Teams, &team("Williams", None)).unwrap();

        let stats = |race_id: Value| -> Record {
            vec![
                ("team_id", team_id.into()),
                ("race_id", race_id),
                ("season_year", 2025i32.into()),
                ("updated_at", "2025-04-01T00:00:00Z".into()),
            ]
        };
        store
            .insert(Table::TeamStatistics, &stats(Value::Null))
            .unwrap();

        let season_level = Filter::new()
            .eq("team_id", team_id)
            .eq("season_year", 2025i32)
            .is_null("race_id");
        assert!(store.find_id(Table::TeamStatistics, &season_level).unwrap().is_some());

        let per_race = Filter::new().eq("team_id", team_id).eq("race_id", 1i64);
        assert!(store.find_id(Table::TeamStatistics, &per_race).unwrap().is_none());
    }

    #[test]
    fn test_insert_violating_constraint_fails() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(Table::Teams, &team("Haas", None)).unwrap();
        assert!(store.insert(Table::Teams, &team("Haas", None)).is_err());
    }

    #[test]
    fn test_open_on_disk_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("season.db");

        let store = SqliteStore::new(&path).unwrap();
        store.insert(Table::Teams, &team("Sauber", None)).unwrap();
        drop(store);

        let reopened = SqliteStore::new(&path).unwrap();
        assert_eq!(reopened.count(Table::Teams).unwrap(), 1);
    }
}
