//! Monitor page state: live metrics and their periodic refresh.

pub mod metrics;
pub mod refresh;

pub use metrics::{MetricsSampler, RandomWalkSampler, SystemMetrics};
pub use refresh::{spawn_refresh, RefreshHandle};
