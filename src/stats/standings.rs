//! Current championship positions, used only to annotate published
//! statistics. Never merged into the aggregated counters.

use anyhow::Result;
use std::collections::HashMap;
use tracing::warn;

use crate::storage::{EntityKind, EntityResolver, Store};
use crate::types::StandingEntry;

/// Position and points of one entity in the current standings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub position: i64,
    pub points: i64,
}

/// Standings keyed by store id
#[derive(Debug, Clone, Default)]
pub struct StandingsLookup {
    drivers: HashMap<i64, Standing>,
    teams: HashMap<i64, Standing>,
}

impl StandingsLookup {
    /// Resolve normalized standings entries to store ids. Entries whose
    /// driver or team is not stored are dropped.
    pub fn resolve<S: Store>(
        resolver: &mut EntityResolver<'_, S>,
        drivers: &[StandingEntry],
        teams: &[StandingEntry],
    ) -> Result<Self> {
        Ok(Self {
            drivers: resolve_side(resolver, EntityKind::Driver, drivers)?,
            teams: resolve_side(resolver, EntityKind::Team, teams)?,
        })
    }

    /// Current position of a driver, 0 when unranked
    pub fn driver_position(&self, driver_id: i64) -> i64 {
        self.driver(driver_id).map_or(0, |s| s.position)
    }

    /// Current position of a team, 0 when unranked
    pub fn team_position(&self, team_id: i64) -> i64 {
        self.team(team_id).map_or(0, |s| s.position)
    }

    pub fn driver(&self, driver_id: i64) -> Option<&Standing> {
        self.drivers.get(&driver_id)
    }

    pub fn team(&self, team_id: i64) -> Option<&Standing> {
        self.teams.get(&team_id)
    }
}

fn resolve_side<S: Store>(
    resolver: &mut EntityResolver<'_, S>,
    kind: EntityKind,
    entries: &[StandingEntry],
) -> Result<HashMap<i64, Standing>> {
    let mut resolved = HashMap::with_capacity(entries.len());
    for entry in entries {
        let Some(id) = resolver.resolve(kind, &entry.key)? else {
            warn!(kind = ?kind, key = %entry.key, "Standing for unknown entity, skipping");
            continue;
        };
        resolved.insert(
            id,
            Standing {
                position: entry.position,
                points: entry.points,
            },
        );
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Record, SqliteStore, Table};

    fn entry(key: &str, position: i64, points: i64) -> StandingEntry {
        StandingEntry {
            key: key.to_string(),
            position,
            points,
        }
    }

    fn insert_driver(store: &SqliteStore, code: &str) -> i64 {
        let record: Record = vec![
            ("driver_code", code.into()),
            ("first_name", "First".into()),
            ("last_name", "Last".into()),
            ("updated_at", "2025-04-01T00:00:00Z".into()),
        ];
        store.insert(Table::Drivers, &record).unwrap()
    }

    #[test]
    fn test_lookup_defaults_to_zero() {
        let store = SqliteStore::in_memory().unwrap();
        let nor = insert_driver(&store, "NOR");
        let pia = insert_driver(&store, "PIA");
        let mut resolver = EntityResolver::new(&store, 2025);

        let lookup = StandingsLookup::resolve(
            &mut resolver,
            &[entry("NOR", 1, 77), entry("GHOST", 2, 50)],
            &[],
        )
        .unwrap();

        assert_eq!(lookup.driver_position(nor), 1);
        assert_eq!(lookup.driver(nor).unwrap().points, 77);
        assert_eq!(lookup.driver_position(pia), 0);
        assert!(lookup.driver(pia).is_none());
        assert_eq!(lookup.team_position(nor), 0);
    }

    #[test]
    fn test_team_positions() {
        let store = SqliteStore::in_memory().unwrap();
        let record: Record = vec![
            ("team_name", "Mercedes".into()),
            ("updated_at", "2025-04-01T00:00:00Z".into()),
        ];
        let mercedes = store.insert(Table::Teams, &record).unwrap();
        let mut resolver = EntityResolver::new(&store, 2025);

        let lookup =
            StandingsLookup::resolve(&mut resolver, &[], &[entry("Mercedes", 2, 57)]).unwrap();
        assert_eq!(lookup.team_position(mercedes), 2);
        assert_eq!(lookup.team(mercedes).unwrap().points, 57);
    }
}
