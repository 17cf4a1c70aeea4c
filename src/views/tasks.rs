//! Task list filtering and dashboard counters.

use crate::task::{Task, TaskPriority, TaskStatus};
use crate::views::filter::{contains_ignore_case, Filter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskFilters {
    #[serde(default)]
    pub status: Filter<TaskStatus>,
    #[serde(default)]
    pub priority: Filter<TaskPriority>,
    #[serde(default)]
    pub search: String,
}

impl TaskFilters {
    pub fn merge(&mut self, patch: TaskFiltersPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(search) = patch.search {
            self.search = search;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskFiltersPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Filter<TaskStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Filter<TaskPriority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Aggregate counters for the dashboard header. Paused tasks count towards
/// `total` only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub running: usize,
    pub success: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Tasks matching every filter, in collection order.
pub fn filtered_tasks(tasks: &[Task], filters: &TaskFilters) -> Vec<Task> {
    let needle = filters.search.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            filters.status.matches(&task.status)
                && filters.priority.matches(&task.priority)
                && (contains_ignore_case(&task.name, &needle)
                    || contains_ignore_case(&task.description, &needle))
        })
        .cloned()
        .collect()
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..Default::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Running => stats.running += 1,
            TaskStatus::Success => stats.success += 1,
            TaskStatus::Failed => stats.failed += 1,
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::Paused => {}
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;

    fn task(name: &str, description: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        let mut task = NewTask {
            name: name.to_string(),
            description: description.to_string(),
            cron_expression: "* * * * *".to_string(),
            priority,
            agent_id: "agent-1".to_string(),
            workflow_id: "workflow-1".to_string(),
        }
        .into_task()
        .unwrap();
        task.status = status;
        task
    }

    fn sample() -> Vec<Task> {
        vec![
            task("Code quality", "ESLint and tsc", TaskStatus::Running, TaskPriority::High),
            task("Test suite", "Unit and integration", TaskStatus::Success, TaskPriority::Medium),
            task("Deploy staging", "Ship to staging", TaskStatus::Failed, TaskPriority::Urgent),
            task("Docs", "Regenerate LINT report", TaskStatus::Paused, TaskPriority::Low),
        ]
    }

    #[test]
    fn test_default_filters_return_everything_in_order() {
        let tasks = sample();
        let result = filtered_tasks(&tasks, &TaskFilters::default());
        assert_eq!(result, tasks);
    }

    #[test]
    fn test_status_filter() {
        let tasks = sample();
        let filters = TaskFilters {
            status: Filter::Only(TaskStatus::Running),
            ..Default::default()
        };
        let result = filtered_tasks(&tasks, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Code quality");
    }

    #[test]
    fn test_search_matches_name_or_description_case_insensitively() {
        let tasks = sample();
        let filters = TaskFilters {
            search: "LiNt".to_string(),
            ..Default::default()
        };
        let names: Vec<_> = filtered_tasks(&tasks, &filters)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Code quality", "Docs"]);
    }

    #[test]
    fn test_filters_are_anded() {
        let tasks = sample();
        let filters = TaskFilters {
            status: Filter::Only(TaskStatus::Paused),
            priority: Filter::Only(TaskPriority::High),
            search: "lint".to_string(),
        };
        assert!(filtered_tasks(&tasks, &filters).is_empty());
    }

    #[test]
    fn test_stats_exclude_paused() {
        let tasks = sample();
        let stats = task_stats(&tasks);
        assert_eq!(
            stats,
            TaskStats {
                total: 4,
                running: 1,
                success: 1,
                failed: 1,
                pending: 0,
            }
        );
        assert!(stats.running + stats.success + stats.failed + stats.pending < stats.total);
    }

    #[test]
    fn test_stats_sum_equals_total_without_paused() {
        let tasks: Vec<Task> = sample()
            .into_iter()
            .filter(|t| t.status != TaskStatus::Paused)
            .collect();
        let stats = task_stats(&tasks);
        assert_eq!(
            stats.running + stats.success + stats.failed + stats.pending,
            stats.total
        );
    }

    #[test]
    fn test_merge_patch() {
        let mut filters = TaskFilters {
            search: "deploy".to_string(),
            ..Default::default()
        };
        filters.merge(TaskFiltersPatch {
            priority: Some(Filter::Only(TaskPriority::Urgent)),
            ..Default::default()
        });
        assert_eq!(filters.search, "deploy");
        assert_eq!(filters.priority, Filter::Only(TaskPriority::Urgent));
        assert_eq!(filters.status, Filter::All);
    }
}
