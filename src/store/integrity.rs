//! Cross-collection reference checks.

use crate::agent::Agent;
use crate::error::{Result, TaskpilotError};
use crate::store::collection::{Collection, Entity};
use crate::task::Task;
use crate::workflow::{validate_workflow, GraphReport, Workflow};
use serde::Serialize;

/// A task pointing at an agent or workflow that is not in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReference {
    pub task_id: String,
    pub field: &'static str,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub dangling: Vec<DanglingReference>,
    /// Only workflows whose graph has errors or warnings.
    pub workflows: Vec<GraphReport>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.workflows.iter().all(GraphReport::is_valid)
    }
}

fn task_references(task: &Task) -> impl Iterator<Item = (&'static str, &str)> {
    [("agentId", task.agent_id.as_str()), ("workflowId", task.workflow_id.as_str())]
        .into_iter()
        .filter(|(_, target)| !target.is_empty())
}

fn dangling_for(
    agents: &Collection<Agent>,
    workflows: &Collection<Workflow>,
    task: &Task,
) -> Vec<DanglingReference> {
    task_references(task)
        .filter(|(field, target)| match *field {
            "agentId" => !agents.contains(target),
            _ => !workflows.contains(target),
        })
        .map(|(field, target)| DanglingReference {
            task_id: task.id.clone(),
            field,
            target: target.to_string(),
        })
        .collect()
}

/// Fail on the first reference that does not resolve. Empty ids count as unset.
pub(crate) fn check_task(
    agents: &Collection<Agent>,
    workflows: &Collection<Workflow>,
    task: &Task,
) -> Result<()> {
    match dangling_for(agents, workflows, task).into_iter().next() {
        Some(reference) => {
            tracing::warn!(
                "Task {} references missing {} {}",
                reference.task_id,
                reference.field,
                reference.target
            );
            Err(TaskpilotError::DanglingReference {
                kind: Task::KIND,
                id: reference.task_id,
                field: reference.field,
                target: reference.target,
            })
        }
        None => Ok(()),
    }
}

pub(crate) fn check_all(
    tasks: &[Task],
    agents: &Collection<Agent>,
    workflows: &Collection<Workflow>,
) -> IntegrityReport {
    let dangling = tasks
        .iter()
        .flat_map(|task| dangling_for(agents, workflows, task))
        .collect();
    let workflows = workflows
        .items()
        .iter()
        .map(validate_workflow)
        .filter(|report| !report.errors.is_empty() || !report.warnings.is_empty())
        .collect();
    IntegrityReport { dangling, workflows }
}
