//! SQLite storage for season data
//!
//! Provides the store interface used by the sync, natural-key resolution and
//! create-or-update reconciliation.

pub mod reconcile;
pub mod repository;
pub mod resolver;
pub mod schema;

pub use reconcile::{db_timestamp, reconcile_entity, Reconcilable, Reconciled};
pub use repository::{Filter, Record, SqliteStore, Store, Table, Value};
pub use resolver::{EntityKind, EntityResolver};
