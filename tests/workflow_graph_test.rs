//! Step graph semantics and workflow views over the demo workflows.

use chrono::Utc;
use taskpilot_lib::error::TaskpilotError;
use taskpilot_lib::fixtures::demo_snapshot;
use taskpilot_lib::views::{filtered_workflows, workflow_categories, WorkflowFilters};
use taskpilot_lib::workflow::{
    validate_workflow, GraphIssue, StepGraph, StepType, Transition, Workflow, WorkflowStep,
};

fn demo_workflows() -> Vec<Workflow> {
    demo_snapshot(Utc::now()).workflows
}

fn deployment() -> Workflow {
    demo_workflows()
        .into_iter()
        .find(|w| w.id == "workflow-3")
        .unwrap()
}

#[test]
fn test_demo_workflows_validate() {
    for workflow in demo_workflows() {
        let report = validate_workflow(&workflow);
        assert!(report.errors.is_empty(), "{}: {:?}", workflow.id, report.errors);
        assert!(report.warnings.is_empty(), "{}: {:?}", workflow.id, report.warnings);
    }
}

#[test]
fn test_condition_step_branches_without_labels() {
    let workflow = deployment();
    let graph = StepGraph::new(&workflow);

    assert_eq!(graph.entry().unwrap().id, "step-1");
    assert_eq!(graph.transition("step-1").unwrap(), Transition::Linear("step-2"));
    assert_eq!(
        graph.transition("step-2").unwrap(),
        Transition::Branch(vec!["step-3", "step-5"])
    );
    assert_eq!(graph.transition("step-4").unwrap(), Transition::Terminal);
    assert!(graph.is_terminal("step-5").unwrap());
}

#[test]
fn test_reachable_is_breadth_first() {
    let workflow = deployment();
    let ids: Vec<_> = StepGraph::new(&workflow)
        .reachable()
        .into_iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["step-1", "step-2", "step-3", "step-5", "step-4"]);
}

#[test]
fn test_predecessors() {
    let workflow = deployment();
    let graph = StepGraph::new(&workflow);
    let preds: Vec<_> = graph
        .predecessors("step-5")
        .unwrap()
        .into_iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(preds, vec!["step-2"]);
    assert!(graph.predecessors("step-1").unwrap().is_empty());
    assert!(graph.predecessors("nope").unwrap_err().is_not_found());
}

#[test]
fn test_one_dangling_edge_fails_and_names_it() {
    let mut workflow = deployment();
    assert!(validate_workflow(&workflow).is_valid());

    workflow.steps[2].next_steps.push("step-9".to_string());
    let report = validate_workflow(&workflow);
    assert!(!report.is_valid());
    assert_eq!(
        report.errors,
        vec![GraphIssue::DanglingEdge {
            step_id: "step-3".to_string(),
            target: "step-9".to_string(),
        }]
    );

    match report.into_result() {
        Err(TaskpilotError::InvalidWorkflow { id, reason }) => {
            assert_eq!(id, "workflow-3");
            assert!(reason.contains("step-3"));
            assert!(reason.contains("step-9"));
        }
        other => panic!("expected InvalidWorkflow, got {:?}", other),
    }
}

#[test]
fn test_loop_cycle_is_not_flagged() {
    let mut workflow = Workflow::new("Retry until green", "testing");
    workflow.steps = vec![
        WorkflowStep::new("run", "Run tests", StepType::Action).then("retry"),
        WorkflowStep::new("retry", "Retry", StepType::Loop)
            .with_config("maxIterations", serde_json::json!(3))
            .then("run")
            .then("done"),
        WorkflowStep::new("done", "Done", StepType::Action),
    ];
    let report = validate_workflow(&workflow);
    assert!(report.is_valid());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_empty_workflow_has_no_entry() {
    let workflow = Workflow::new("Empty", "");
    let graph = StepGraph::new(&workflow);
    assert!(graph.entry().is_none());
    assert!(graph.reachable().is_empty());
    assert!(graph.validate().is_valid());
}

#[test]
fn test_workflow_library_views() {
    let workflows = demo_workflows();
    assert_eq!(
        workflow_categories(&workflows),
        vec!["deployment", "quality", "testing"]
    );

    let templates = filtered_workflows(
        &workflows,
        &WorkflowFilters {
            templates_only: true,
            ..Default::default()
        },
    );
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, "workflow-2");

    let searched = filtered_workflows(
        &workflows,
        &WorkflowFilters {
            search: "PRODUCTION".to_string(),
            ..Default::default()
        },
    );
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].id, "workflow-3");
}
