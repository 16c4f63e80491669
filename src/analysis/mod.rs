//! Activity analysis.
//!
//! Collects per-repository statistics into weekly activity and rolls it
//! up into monthly distinct-contributor counts.

pub mod aggregator;
pub mod collector;
pub mod monthly;

pub use aggregator::WeeklyActivity;
pub use collector::collect_activity;
pub use monthly::monthly_counts;
