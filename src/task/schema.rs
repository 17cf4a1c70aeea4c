//! Task data structures.

use crate::error::{Result, TaskpilotError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A schedulable unit of work bound to a cron expression, an agent and a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Cron expression, stored verbatim and never evaluated here.
    pub cron_expression: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub agent_id: String,
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub execution_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
}

impl Task {
    /// Percentage of successful runs, 0 when the task never ran.
    pub fn success_rate(&self) -> f64 {
        if self.execution_count == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.execution_count as f64 * 100.0
    }

    /// Merge a partial update. Does not touch `updated_at`; the store does that.
    pub fn apply(&mut self, patch: TaskPatch) {
        let TaskPatch {
            name,
            description,
            cron_expression,
            status,
            priority,
            agent_id,
            workflow_id,
            last_run,
            next_run,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(cron_expression) = cron_expression {
            self.cron_expression = cron_expression;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(agent_id) = agent_id {
            self.agent_id = agent_id;
        }
        if let Some(workflow_id) = workflow_id {
            self.workflow_id = workflow_id;
        }
        if let Some(last_run) = last_run {
            self.last_run = last_run;
        }
        if let Some(next_run) = next_run {
            self.next_run = next_run;
        }
    }
}

/// Partial update for a [`Task`]. Identity, creation time and run counters are
/// deliberately absent: they are owned by the executor, not by editors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    /// `Some(None)` clears the timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn touches_references(&self) -> bool {
        self.agent_id.is_some() || self.workflow_id.is_some()
    }
}

/// Payload of the task creation form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub cron_expression: String,
    #[serde(default)]
    pub priority: TaskPriority,
    pub agent_id: String,
    pub workflow_id: String,
}

impl NewTask {
    /// The creation form's required-field checks.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("cron expression", &self.cron_expression),
            ("agent", &self.agent_id),
            ("workflow", &self.workflow_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(TaskpilotError::Validation(format!(
                    "Task {} cannot be empty",
                    field
                )));
            }
        }
        Ok(())
    }

    /// Build a pending task with a fresh id and zeroed counters.
    pub fn into_task(self) -> Result<Task> {
        self.validate()?;
        let now = Utc::now();
        Ok(Task {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            description: self.description,
            cron_expression: self.cron_expression,
            status: TaskStatus::Pending,
            priority: self.priority,
            agent_id: self.agent_id,
            workflow_id: self.workflow_id,
            last_run: None,
            next_run: None,
            created_at: now,
            updated_at: now,
            execution_count: 0,
            success_count: 0,
            failure_count: 0,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
    Paused,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::Running,
        TaskStatus::Success,
        TaskStatus::Failed,
        TaskStatus::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
            TaskStatus::Paused => "paused",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Dashboard play/pause button: running pauses, anything else runs.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Running => TaskStatus::Paused,
            _ => TaskStatus::Running,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
