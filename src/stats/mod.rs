//! Season statistics
//!
//! Folds resolved results into per-driver and per-team counters, annotates
//! them with the current championship positions and publishes one row per
//! entity and season.

pub mod aggregate;
pub mod publish;
pub mod standings;

pub use aggregate::{ResultAggregator, RoundResults};
pub use publish::StatisticsPublisher;
pub use standings::StandingsLookup;
