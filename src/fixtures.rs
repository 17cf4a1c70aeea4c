//! Demo data the dashboard boots with when the store is empty.

use crate::agent::{Agent, AgentStatus};
use crate::execution::{ExecutionLog, ExecutionStatus, Metadata};
use crate::store::{SeedReport, Store, StoreSnapshot};
use crate::task::{Task, TaskPriority, TaskStatus};
use crate::workflow::{StepType, Workflow, WorkflowStep};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

/// Fill every empty collection with the demo data. Collections that already
/// hold items are left untouched, so calling this twice seeds at most once.
pub fn seed_if_empty(store: &Store) -> SeedReport {
    let report = store.seed_empty(demo_snapshot(Utc::now()));
    if report.is_empty() {
        tracing::debug!("Store already populated, skipping fixtures");
    } else {
        tracing::info!(
            "Seeded fixtures: {} tasks, {} agents, {} workflows, {} logs",
            report.tasks,
            report.agents,
            report.workflows,
            report.execution_logs
        );
    }
    report
}

/// The demo data with every timestamp relative to `now`.
pub fn demo_snapshot(now: DateTime<Utc>) -> StoreSnapshot {
    StoreSnapshot {
        tasks: tasks(now),
        agents: agents(now),
        workflows: workflows(now),
        execution_logs: execution_logs(now),
        system_config: Default::default(),
    }
}

#[allow(clippy::too_many_arguments)]
fn task(
    now: DateTime<Utc>,
    id: &str,
    name: &str,
    description: &str,
    cron_expression: &str,
    status: TaskStatus,
    priority: TaskPriority,
    workflow_id: &str,
    agent_id: &str,
    last_run: Duration,
    next_run: Duration,
    counts: (u64, u64, u64),
) -> Task {
    Task {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        cron_expression: cron_expression.to_string(),
        status,
        priority,
        agent_id: agent_id.to_string(),
        workflow_id: workflow_id.to_string(),
        last_run: Some(now - last_run),
        next_run: Some(now + next_run),
        created_at: now - Duration::days(7),
        updated_at: now - last_run,
        execution_count: counts.0,
        success_count: counts.1,
        failure_count: counts.2,
    }
}

fn tasks(now: DateTime<Utc>) -> Vec<Task> {
    vec![
        task(
            now,
            "task-1",
            "Code quality check",
            "Daily lint and type-check run over the main branch",
            "0 9 * * *",
            TaskStatus::Running,
            TaskPriority::High,
            "workflow-1",
            "agent-1",
            Duration::hours(2),
            Duration::hours(22),
            (15, 14, 1),
        ),
        task(
            now,
            "task-2",
            "Automated tests",
            "Unit and integration tests to keep the build green",
            "0 */2 * * *",
            TaskStatus::Success,
            TaskPriority::Medium,
            "workflow-2",
            "agent-2",
            Duration::minutes(30),
            Duration::minutes(90),
            (36, 35, 1),
        ),
        task(
            now,
            "task-3",
            "Deploy to staging",
            "Ship the latest build to the staging environment",
            "0 18 * * 1-5",
            TaskStatus::Failed,
            TaskPriority::Urgent,
            "workflow-3",
            "agent-3",
            Duration::hours(4),
            Duration::hours(14),
            (8, 6, 2),
        ),
    ]
}

fn agents(now: DateTime<Utc>) -> Vec<Agent> {
    let agent = |id: &str, name: &str, description: &str, capabilities: &[&str], status| Agent {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        status,
        version: "1.0.0".to_string(),
        last_heartbeat: now,
    };
    vec![
        agent(
            "agent-1",
            "Code Review Agent",
            "Code review and quality checks",
            &["code analysis", "eslint", "typescript", "security scan"],
            AgentStatus::Online,
        ),
        agent(
            "agent-2",
            "Test Runner Agent",
            "Runs automated test suites",
            &["unit tests", "integration tests", "e2e tests", "performance tests"],
            AgentStatus::Online,
        ),
        agent(
            "agent-3",
            "Deploy Agent",
            "Builds and deploys releases",
            &["build", "deploy", "rollback", "health check"],
            AgentStatus::Offline,
        ),
        agent(
            "agent-4",
            "Documentation Agent",
            "Generates and maintains documentation",
            &["api docs", "readme", "changelog", "code comments"],
            AgentStatus::Online,
        ),
    ]
}

fn workflow(
    now: DateTime<Utc>,
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    is_template: bool,
    steps: Vec<WorkflowStep>,
) -> Workflow {
    Workflow {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        steps,
        is_template,
        category: category.to_string(),
        created_at: now - Duration::days(14),
        updated_at: now - Duration::days(1),
    }
}

fn workflows(now: DateTime<Utc>) -> Vec<Workflow> {
    vec![
        workflow(
            now,
            "workflow-1",
            "Code quality pipeline",
            "Lint, type-check and security scan",
            "quality",
            false,
            vec![
                WorkflowStep::new("step-1", "Checkout", StepType::Action)
                    .with_config("repository", json!("main"))
                    .with_config("branch", json!("main"))
                    .then("step-2")
                    .at(100.0, 100.0),
                WorkflowStep::new("step-2", "ESLint", StepType::Action)
                    .with_config("rules", json!("strict"))
                    .then("step-3")
                    .at(300.0, 100.0),
                WorkflowStep::new("step-3", "TypeScript check", StepType::Action)
                    .with_config("strict", json!(true))
                    .then("step-4")
                    .at(500.0, 100.0),
                WorkflowStep::new("step-4", "Report", StepType::Action)
                    .with_config("format", json!("html"))
                    .at(700.0, 100.0),
            ],
        ),
        workflow(
            now,
            "workflow-2",
            "Test pipeline",
            "Unit, integration and end-to-end tests",
            "testing",
            true,
            vec![
                WorkflowStep::new("step-1", "Prepare environment", StepType::Action)
                    .with_config("environment", json!("test"))
                    .then("step-2")
                    .at(100.0, 100.0),
                WorkflowStep::new("step-2", "Unit tests", StepType::Action)
                    .with_config("coverage", json!(true))
                    .then("step-3")
                    .at(300.0, 100.0),
                WorkflowStep::new("step-3", "Integration tests", StepType::Action)
                    .with_config("database", json!("mock"))
                    .then("step-4")
                    .at(500.0, 100.0),
                WorkflowStep::new("step-4", "Report", StepType::Action)
                    .with_config("format", json!("junit"))
                    .at(700.0, 100.0),
            ],
        ),
        workflow(
            now,
            "workflow-3",
            "Deployment",
            "Deploy to staging and production",
            "deployment",
            false,
            vec![
                WorkflowStep::new("step-1", "Build", StepType::Action)
                    .with_config("target", json!("production"))
                    .then("step-2")
                    .at(100.0, 100.0),
                WorkflowStep::new("step-2", "Run tests", StepType::Condition)
                    .with_config("required", json!(true))
                    .then("step-3")
                    .then("step-5")
                    .at(300.0, 100.0),
                WorkflowStep::new("step-3", "Deploy to staging", StepType::Action)
                    .with_config("environment", json!("staging"))
                    .then("step-4")
                    .at(500.0, 50.0),
                WorkflowStep::new("step-4", "Deploy to production", StepType::Action)
                    .with_config("environment", json!("production"))
                    .at(700.0, 50.0),
                WorkflowStep::new("step-5", "Notify failure", StepType::Action)
                    .with_config("channel", json!("slack"))
                    .at(500.0, 150.0),
            ],
        ),
    ]
}

fn metadata(value: serde_json::Value) -> Option<Metadata> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn finished_log(
    now: DateTime<Utc>,
    id: &str,
    task_id: &str,
    task_name: &str,
    status: ExecutionStatus,
    started_ago: Duration,
    ran_for: Duration,
    agent_id: &str,
) -> ExecutionLog {
    let start_time = now - started_ago;
    ExecutionLog {
        id: id.to_string(),
        task_id: task_id.to_string(),
        task_name: task_name.to_string(),
        status,
        start_time,
        end_time: Some(start_time + ran_for),
        duration_ms: u64::try_from(ran_for.num_milliseconds()).ok(),
        result: None,
        error: None,
        agent_id: Some(agent_id.to_string()),
        metadata: None,
    }
}

fn execution_logs(now: DateTime<Utc>) -> Vec<ExecutionLog> {
    let mut quality = finished_log(
        now,
        "exec-1",
        "task-1",
        "Code quality check",
        ExecutionStatus::Completed,
        Duration::hours(2),
        Duration::minutes(5),
        "agent-1",
    );
    quality.result = Some("Check finished: 3 warnings, 0 errors".to_string());
    quality.metadata = metadata(json!({
        "lintWarnings": 3,
        "lintErrors": 0,
        "coverage": 85.2,
        "filesChecked": 42
    }));

    let tests = ExecutionLog {
        id: "exec-2".to_string(),
        ..ExecutionLog::start("task-2", "Automated tests", now - Duration::minutes(30))
    }
    .with_agent("agent-2")
    .with_metadata(
        metadata(json!({
            "currentStep": "Integration tests",
            "progress": 65,
            "testsRun": 128,
            "testsPassed": 125
        }))
        .unwrap_or_default(),
    );

    let mut deploy = finished_log(
        now,
        "exec-3",
        "task-3",
        "Deploy to production",
        ExecutionStatus::Failed,
        Duration::hours(4),
        Duration::minutes(10),
        "agent-3",
    );
    deploy.error = Some("Deployment failed: database connection timed out".to_string());
    deploy.metadata = metadata(json!({
        "deploymentStage": "database-migration",
        "errorCode": "DB_TIMEOUT",
        "retryCount": 3
    }));

    let mut docs = finished_log(
        now,
        "exec-4",
        "task-4",
        "Generate docs",
        ExecutionStatus::Completed,
        Duration::hours(6),
        Duration::minutes(3),
        "agent-4",
    );
    docs.result = Some("Docs generated: 15 pages".to_string());
    docs.metadata = metadata(json!({
        "pagesGenerated": 15,
        "apiEndpoints": 42,
        "codeExamples": 28
    }));

    let mut cancelled = finished_log(
        now,
        "exec-5",
        "task-1",
        "Code quality check",
        ExecutionStatus::Cancelled,
        Duration::hours(8),
        Duration::minutes(2),
        "agent-1",
    );
    cancelled.metadata = metadata(json!({
        "reason": "user_cancelled",
        "progress": 25
    }));

    vec![quality, tests, deploy, docs, cancelled]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::validate_workflow;

    #[test]
    fn test_demo_data_is_consistent() {
        let snapshot = demo_snapshot(Utc::now());
        for task in &snapshot.tasks {
            assert!(snapshot.agents.iter().any(|a| a.id == task.agent_id));
            assert!(snapshot.workflows.iter().any(|w| w.id == task.workflow_id));
        }
        for workflow in &snapshot.workflows {
            assert!(validate_workflow(workflow).is_valid(), "{}", workflow.id);
        }
    }

    #[test]
    fn test_logs_most_recent_first() {
        let logs = execution_logs(Utc::now());
        assert!(logs.windows(2).all(|w| w[0].start_time >= w[1].start_time));
        assert_eq!(
            logs.iter()
                .filter(|l| l.status == ExecutionStatus::Running)
                .count(),
            1
        );
    }

    #[test]
    fn test_seed_only_fills_empty_collections() {
        let store = Store::default();
        store.set_agents(Vec::new());
        let first = seed_if_empty(&store);
        assert_eq!(first.tasks, 3);
        assert_eq!(first.agents, 4);
        assert_eq!(first.workflows, 3);
        assert_eq!(first.execution_logs, 5);

        let second = seed_if_empty(&store);
        assert!(second.is_empty());
        assert_eq!(store.tasks().len(), 3);
    }
}
