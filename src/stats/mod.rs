// Stats module - Latency tracking and connection health snapshots
pub mod latency;
pub mod reporter;

pub use latency::LatencyTracker;
pub use reporter::{StatsCollector, StatsSnapshot};
