//! Season fold of race, sprint and qualifying results into per-driver and
//! per-team counters.
//!
//! Counting rules:
//! - race: points, win at P1, podium at P1-P3, fastest lap when flagged
//! - sprint: points, sprint win at P1, never a podium
//! - qualifying: pole at P1 for the driver only, no points, no team effect
//!
//! Unclassified records (position <= 0) are ignored.

use std::collections::BTreeMap;
use tracing::warn;

use crate::types::{ResultKind, ResultRecord};

/// Season counters for one driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverTally {
    pub race_wins: i64,
    pub sprint_wins: i64,
    pub podiums: i64,
    pub poles: i64,
    pub fastest_laps: i64,
    pub total_points: i64,
}

/// Season counters for one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamTally {
    pub race_wins: i64,
    pub sprint_wins: i64,
    pub podiums: i64,
    pub fastest_laps: i64,
    pub total_points: i64,
}

/// Resolved results of one round, per session
#[derive(Debug, Clone, Default)]
pub struct RoundResults {
    pub round: u32,
    pub race: Vec<ResultRecord>,
    pub sprint: Vec<ResultRecord>,
    pub qualifying: Vec<ResultRecord>,
}

/// Final counters after every round of the season
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonTally {
    pub drivers: BTreeMap<i64, DriverTally>,
    pub teams: BTreeMap<i64, TeamTally>,
}

/// Running fold over a season's rounds
#[derive(Debug, Default)]
pub struct ResultAggregator {
    tally: SeasonTally,
    last_round: Option<u32>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a whole season, ordering rounds ascending first
    pub fn fold_season(mut rounds: Vec<RoundResults>) -> SeasonTally {
        rounds.sort_by_key(|r| r.round);
        let mut aggregator = Self::new();
        for round in &rounds {
            aggregator.apply_round(round);
        }
        aggregator.finish()
    }

    /// Apply one round: race, then sprint, then qualifying
    pub fn apply_round(&mut self, round: &RoundResults) {
        if let Some(last) = self.last_round {
            if round.round <= last {
                warn!(round = round.round, last, "Round applied out of order");
            }
        }
        self.last_round = Some(round.round);

        for record in round.race.iter().chain(&round.sprint).chain(&round.qualifying) {
            self.apply(record);
        }
    }

    /// Apply a single result record
    pub fn apply(&mut self, record: &ResultRecord) {
        if !record.is_classified() {
            return;
        }

        let winner = record.position == 1;
        let driver = self.tally.drivers.entry(record.driver_id).or_default();

        match record.kind {
            ResultKind::Race => {
                let podium = record.position <= 3;
                driver.total_points = driver.total_points.saturating_add(record.points);
                driver.race_wins += i64::from(winner);
                driver.podiums += i64::from(podium);
                driver.fastest_laps += i64::from(record.fastest_lap);

                if let Some(team_id) = record.team_id {
                    let team = self.tally.teams.entry(team_id).or_default();
                    team.total_points = team.total_points.saturating_add(record.points);
                    team.race_wins += i64::from(winner);
                    team.podiums += i64::from(podium);
                    team.fastest_laps += i64::from(record.fastest_lap);
                }
            }
            ResultKind::Sprint => {
                driver.total_points = driver.total_points.saturating_add(record.points);
                driver.sprint_wins += i64::from(winner);

                if let Some(team_id) = record.team_id {
                    let team = self.tally.teams.entry(team_id).or_default();
                    team.total_points = team.total_points.saturating_add(record.points);
                    team.sprint_wins += i64::from(winner);
                }
            }
            ResultKind::Qualifying => {
                driver.poles += i64::from(winner);
            }
        }
    }

    /// Freeze the counters
    pub fn finish(self) -> SeasonTally {
        self.tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC: i64 = 1;
    const XYZ: i64 = 2;
    const TEAM: i64 = 10;

    fn record(kind: ResultKind, driver_id: i64, position: i64, points: i64, fastest_lap: bool) -> ResultRecord {
        ResultRecord {
            kind,
            driver_id,
            team_id: (kind != ResultKind::Qualifying).then_some(TEAM),
            race_id: 100,
            position,
            points,
            fastest_lap,
        }
    }

    #[test]
    fn test_race_win_with_fastest_lap_and_sprint_second() {
        let round = RoundResults {
            round: 1,
            race: vec![record(ResultKind::Race, ABC, 1, 25, true)],
            sprint: vec![record(ResultKind::Sprint, ABC, 2, 7, false)],
            qualifying: vec![],
        };

        let tally = ResultAggregator::fold_season(vec![round]);
        assert_eq!(
            tally.drivers[&ABC],
            DriverTally {
                race_wins: 1,
                sprint_wins: 0,
                podiums: 1,
                poles: 0,
                fastest_laps: 1,
                total_points: 32,
            }
        );
        assert_eq!(tally.teams[&TEAM].total_points, 32);
        assert_eq!(tally.teams[&TEAM].podiums, 1);
    }

    #[test]
    fn test_pole_only() {
        let round = RoundResults {
            round: 1,
            qualifying: vec![record(ResultKind::Qualifying, XYZ, 1, 0, false)],
            ..Default::default()
        };

        let tally = ResultAggregator::fold_season(vec![round]);
        let xyz = tally.drivers[&XYZ];
        assert_eq!(xyz.poles, 1);
        assert_eq!(xyz.total_points, 0);
        assert_eq!(xyz.race_wins, 0);
        assert!(tally.teams.is_empty());
    }

    #[test]
    fn test_unclassified_records_leave_counters_untouched() {
        let mut aggregator = ResultAggregator::new();
        for position in [0, -1, -20] {
            aggregator.apply(&record(ResultKind::Race, ABC, position, 25, true));
            aggregator.apply(&record(ResultKind::Sprint, ABC, position, 8, false));
            aggregator.apply(&record(ResultKind::Qualifying, ABC, position, 0, false));
        }

        assert_eq!(aggregator.finish(), SeasonTally::default());
    }

    #[test]
    fn test_podium_boundaries() {
        let mut aggregator = ResultAggregator::new();
        for position in 1..=5 {
            aggregator.apply(&record(ResultKind::Race, position, position, 0, false));
        }
        let tally = aggregator.finish();

        for driver_id in 1..=3i64 {
            assert_eq!(tally.drivers[&driver_id].podiums, 1);
        }
        for driver_id in 4..=5i64 {
            assert_eq!(tally.drivers[&driver_id].podiums, 0);
        }
        assert_eq!(tally.drivers[&1i64].race_wins, 1);
        assert_eq!(tally.drivers[&2i64].race_wins, 0);
        assert_eq!(tally.teams[&TEAM].podiums, 3);
    }

    #[test]
    fn test_sprint_never_counts_as_podium() {
        let mut aggregator = ResultAggregator::new();
        for position in 1..=3 {
            aggregator.apply(&record(ResultKind::Sprint, ABC, position, 8 - position, false));
        }
        let tally = aggregator.finish();

        assert_eq!(tally.drivers[&ABC].podiums, 0);
        assert_eq!(tally.drivers[&ABC].sprint_wins, 1);
        assert_eq!(tally.drivers[&ABC].total_points, 7 + 6 + 5);
        assert_eq!(tally.teams[&TEAM].podiums, 0);
    }

    #[test]
    fn test_points_sum_across_rounds() {
        let rounds = (1..=3)
            .map(|round| RoundResults {
                round,
                race: vec![record(ResultKind::Race, ABC, 4, 12, false)],
                sprint: vec![record(ResultKind::Sprint, ABC, 3, 6, false)],
                qualifying: vec![record(ResultKind::Qualifying, ABC, 2, 0, false)],
            })
            .collect();

        let tally = ResultAggregator::fold_season(rounds);
        assert_eq!(tally.drivers[&ABC].total_points, 3 * (12 + 6));
        assert_eq!(tally.drivers[&ABC].poles, 0);
        assert_eq!(tally.drivers[&ABC].podiums, 0);
    }

    #[test]
    fn test_fold_is_order_independent_after_sorting() {
        let round = |n: u32, driver_id: i64| RoundResults {
            round: n,
            race: vec![record(ResultKind::Race, driver_id, 1, 25, false)],
            ..Default::default()
        };

        let forward = ResultAggregator::fold_season(vec![round(1, ABC), round(2, XYZ)]);
        let reversed = ResultAggregator::fold_season(vec![round(2, XYZ), round(1, ABC)]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_points_saturate_instead_of_overflowing() {
        let mut aggregator = ResultAggregator::new();
        aggregator.apply(&record(ResultKind::Race, ABC, 1, i64::MAX, false));
        aggregator.apply(&record(ResultKind::Sprint, ABC, 1, 8, false));
        aggregator.apply(&record(ResultKind::Race, ABC, 2, i64::MAX, false));

        let tally = aggregator.finish();
        assert_eq!(tally.drivers[&ABC].total_points, i64::MAX);
        assert_eq!(tally.teams[&TEAM].total_points, i64::MAX);
        assert_eq!(tally.drivers[&ABC].race_wins, 1);
    }

    #[test]
    fn test_qualifying_never_touches_team() {
        let mut aggregator = ResultAggregator::new();
        let mut pole = record(ResultKind::Qualifying, ABC, 1, 0, false);
        pole.team_id = Some(TEAM);
        aggregator.apply(&pole);

        let tally = aggregator.finish();
        assert_eq!(tally.drivers[&ABC].poles, 1);
        assert!(tally.teams.is_empty());
    }
}
