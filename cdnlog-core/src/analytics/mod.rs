//! Independent aggregators over a borrowed view of log entries.
//!
//! Each aggregator turns `&[&LogEntry]` plus [`AnalysisConfig`](crate::conf::AnalysisConfig)
//! into one report section. [`run_aggregators`] drives them, sequentially or on
//! scoped threads, and isolates failures per section.

mod buckets;
mod daily;
mod device;
mod drill_down;
mod engine;
mod errors;
mod histogram;
mod performance;
mod query_patterns;
mod slowness;
mod stats;
mod traffic;
mod user_agents;

#[cfg(test)]
mod tests;

pub use buckets::BucketCount;
pub use daily::*;
pub use device::*;
pub use drill_down::*;
pub use engine::*;
pub use errors::*;
pub use histogram::{HistogramBucket, SIZE_BUCKETS_BYTES};
pub use performance::*;
pub use query_patterns::*;
pub use slowness::*;
pub use stats::{RATE_PRECISION, RankedCount};
pub use traffic::*;
pub use user_agents::*;
