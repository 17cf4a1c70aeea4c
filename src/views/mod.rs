//! Derived views: pure projections recomputed from the store on every read.

pub mod filter;
pub mod logs;
pub mod tasks;
pub mod workflows;

pub use filter::{Filter, FilterValue};
pub use logs::{execution_stats, filtered_logs, ExecutionStats, LogFilters, TimeRange};
pub use tasks::{filtered_tasks, task_stats, TaskFilters, TaskFiltersPatch, TaskStats};
pub use workflows::{filtered_workflows, workflow_categories, WorkflowFilters};
