//! Whole-store export and import as pretty JSON.

use crate::agent::Agent;
use crate::config::SystemConfig;
use crate::error::Result;
use crate::execution::ExecutionLog;
use crate::task::Task;
use crate::workflow::Workflow;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a persistence collaborator needs to rebuild the store.
/// Filters, selections and UI flags are session state and are not included.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
    #[serde(default)]
    pub execution_logs: Vec<ExecutionLog>,
    #[serde(default)]
    pub system_config: SystemConfig,
}

/// How many items of each kind a seeding pass added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub tasks: usize,
    pub agents: usize,
    pub workflows: usize,
    pub execution_logs: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.tasks + self.agents + self.workflows + self.execution_logs == 0
    }
}

/// Write the snapshot next to `path` first, then rename over it, so readers
/// never see a half-written file.
pub async fn save_snapshot(snapshot: &StoreSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let text = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, text).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::info!(
        "Saved snapshot to {:?} ({} tasks, {} workflows)",
        path,
        snapshot.tasks.len(),
        snapshot.workflows.len()
    );
    Ok(())
}

pub async fn load_snapshot(path: &Path) -> Result<StoreSnapshot> {
    let text = tokio::fs::read_to_string(path).await?;
    let snapshot = serde_json::from_str(&text)?;
    tracing::info!("Loaded snapshot from {:?}", path);
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskpilotError;
    use crate::workflow::{StepType, WorkflowStep};

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut workflow = Workflow::new("Deploy", "deployment");
        workflow.steps = vec![
            WorkflowStep::new("build", "Build", StepType::Action).then("ship"),
            WorkflowStep::new("ship", "Ship", StepType::Action),
        ];
        let snapshot = StoreSnapshot {
            workflows: vec![workflow],
            ..Default::default()
        };

        save_snapshot(&snapshot, &path).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_snapshot(&path).await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_missing_sections_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, "{}").await.unwrap();

        let snapshot = load_snapshot(&path).await.unwrap();
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.system_config, SystemConfig::default());
    }

    #[tokio::test]
    async fn test_malformed_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = load_snapshot(&path).await.unwrap_err();
        assert!(matches!(err, TaskpilotError::Json(_)));
    }
}
