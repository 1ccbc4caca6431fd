//! Natural key to store id resolution with a cache scoped to one run.

use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

use super::repository::{Filter, Store, Table};

/// Entities addressable by natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// driver_code
    Driver,
    /// team_name
    Team,
    /// race_name within the resolver's season
    Event,
}

impl EntityKind {
    fn table(&self) -> Table {
        match self {
            EntityKind::Driver => Table::Drivers,
            EntityKind::Team => Table::Teams,
            EntityKind::Event => Table::Calendar,
        }
    }
}

/// Resolves natural keys to ids. A miss is not an error: callers skip the
/// record that referenced the key.
pub struct EntityResolver<'a, S: Store> {
    store: &'a S,
    season: i32,
    cache: HashMap<(EntityKind, String), i64>,
    lookups: usize,
}

impl<'a, S: Store> EntityResolver<'a, S> {
    pub fn new(store: &'a S, season: i32) -> Self {
        Self {
            store,
            season,
            cache: HashMap::new(),
            lookups: 0,
        }
    }

    /// Store id for `key`, or `None` when no row has that natural key
    pub fn resolve(&mut self, kind: EntityKind, key: &str) -> Result<Option<i64>> {
        if let Some(id) = self.cache.get(&(kind, key.to_string())) {
            return Ok(Some(*id));
        }

        let filter = match kind {
            EntityKind::Driver => Filter::new().eq("driver_code", key),
            EntityKind::Team => Filter::new().eq("team_name", key),
            EntityKind::Event => Filter::new()
                .eq("race_name", key)
                .eq("season_year", self.season),
        };

        self.lookups += 1;
        let id = self.store.find_id(kind.table(), &filter)?;
        match id {
            Some(id) => {
                self.cache.insert((kind, key.to_string()), id);
            }
            None => debug!(kind = ?kind, key = %key, "No stored row for natural key"),
        }
        Ok(id)
    }

    /// Store round trips made so far
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}
