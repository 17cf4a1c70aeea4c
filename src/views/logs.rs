//! Execution log filtering and monitor counters.

use crate::execution::{ExecutionLog, ExecutionStatus};
use crate::views::filter::{contains_ignore_case, Filter};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    All,
    /// Since midnight (UTC) of the reference day.
    Today,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
}

impl TimeRange {
    /// Earliest start time included, `None` for no lower bound.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::All => None,
            TimeRange::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            TimeRange::Week => Some(now - Duration::days(7)),
            TimeRange::Month => Some(now - Duration::days(30)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogFilters {
    #[serde(default)]
    pub status: Filter<ExecutionStatus>,
    /// Matched against the task name snapshot.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub range: TimeRange,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStats {
    pub total: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    /// Completed share of all logs, as a rounded percentage.
    pub success_rate: u32,
}

/// Logs matching every filter, in collection order (most recent first).
pub fn filtered_logs(
    logs: &[ExecutionLog],
    filters: &LogFilters,
    now: DateTime<Utc>,
) -> Vec<ExecutionLog> {
    let needle = filters.search.to_lowercase();
    let since = filters.range.since(now);
    logs.iter()
        .filter(|log| {
            filters.status.matches(&log.status)
                && contains_ignore_case(&log.task_name, &needle)
                && since.map_or(true, |since| log.start_time >= since)
        })
        .cloned()
        .collect()
}

pub fn execution_stats(logs: &[ExecutionLog]) -> ExecutionStats {
    let count = |status: ExecutionStatus| logs.iter().filter(|l| l.status == status).count();
    let total = logs.len();
    let completed = count(ExecutionStatus::Completed);
    let success_rate = if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u32
    };

    ExecutionStats {
        total,
        running: count(ExecutionStatus::Running),
        completed,
        failed: count(ExecutionStatus::Failed),
        success_rate,
    }
}
