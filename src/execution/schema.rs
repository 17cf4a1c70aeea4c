//! Execution log records.

use crate::error::{Result, TaskpilotError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open key/value metadata attached by the executor.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Record of one task run. Immutable once it reaches a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLog {
    pub id: String,
    pub task_id: String,
    /// Snapshot of the task name at start time; not kept in sync.
    pub task_name: String,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds between start and end.
    #[serde(
        rename = "duration",
        alias = "durationMs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ExecutionLog {
    /// A new running log with a fresh id.
    pub fn start(
        task_id: impl Into<String>,
        task_name: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            task_name: task_name.into(),
            status: ExecutionStatus::Running,
            start_time,
            end_time: None,
            duration_ms: None,
            result: None,
            error: None,
            agent_id: None,
            metadata: None,
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move a running log to its terminal status. Only allowed once.
    pub fn finish(&mut self, outcome: ExecutionOutcome, at: DateTime<Utc>) -> Result<()> {
        let target = outcome.status();
        if self.status != ExecutionStatus::Running {
            return Err(TaskpilotError::InvalidTransition {
                id: self.id.clone(),
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }

        match outcome {
            ExecutionOutcome::Completed { result } => self.result = result,
            ExecutionOutcome::Failed { error } => self.error = Some(error),
            ExecutionOutcome::Cancelled => {}
        }

        self.status = target;
        self.end_time = Some(at);
        self.duration_ms = Some(
            at.signed_duration_since(self.start_time)
                .num_milliseconds()
                .max(0) as u64,
        );
        Ok(())
    }
}

/// How a running log ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionOutcome {
    Completed {
        #[serde(default)]
        result: Option<String>,
    },
    Failed {
        error: String,
    },
    Cancelled,
}

impl ExecutionOutcome {
    pub fn status(&self) -> ExecutionStatus {
        match self {
            ExecutionOutcome::Completed { .. } => ExecutionStatus::Completed,
            ExecutionOutcome::Failed { .. } => ExecutionStatus::Failed,
            ExecutionOutcome::Cancelled => ExecutionStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub const ALL: [ExecutionStatus; 4] = [
        ExecutionStatus::Running,
        ExecutionStatus::Completed,
        ExecutionStatus::Failed,
        ExecutionStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
