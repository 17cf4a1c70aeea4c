//! Step graph semantics: successors, reachability and structural validation.
//!
//! Nodes are a workflow's steps, edges come from each step's `next_steps`.
//! The first step in list order is the entry point. The graph is only
//! interpreted for rendering and linting; nothing here executes a step.

use crate::error::{Result, TaskpilotError};
use crate::workflow::schema::{StepType, Workflow, WorkflowStep};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// How control leaves a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<'a> {
    /// No successors.
    Terminal,
    /// Action with a single successor.
    Linear(&'a str),
    /// Action with several successors: all of them run.
    FanOut(Vec<&'a str>),
    /// Condition successors. Which one maps to which outcome is not recorded
    /// in the model; an executor has to resolve it from the step config.
    Branch(Vec<&'a str>),
    /// Loop successors. Termination is unspecified by the model.
    Iterate(Vec<&'a str>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphIssue {
    DuplicateStepId { step_id: String },
    DanglingEdge { step_id: String, target: String },
    UnreachableStep { step_id: String },
    CycleWithoutLoop { step_ids: Vec<String> },
}

impl GraphIssue {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            GraphIssue::DuplicateStepId { .. } | GraphIssue::DanglingEdge { .. }
        )
    }
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIssue::DuplicateStepId { step_id } => {
                write!(f, "step id {} is used more than once", step_id)
            }
            GraphIssue::DanglingEdge { step_id, target } => {
                write!(f, "step {} points to missing step {}", step_id, target)
            }
            GraphIssue::UnreachableStep { step_id } => {
                write!(f, "step {} is not reachable from the entry step", step_id)
            }
            GraphIssue::CycleWithoutLoop { step_ids } => {
                write!(f, "cycle without a loop step: {}", step_ids.join(" -> "))
            }
        }
    }
}

/// Outcome of [`StepGraph::validate`]. Errors break the graph invariants,
/// warnings are usability lints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphReport {
    pub workflow_id: String,
    pub errors: Vec<GraphIssue>,
    pub warnings: Vec<GraphIssue>,
}

impl GraphReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, issue: GraphIssue) {
        if issue.is_error() {
            self.errors.push(issue);
        } else {
            self.warnings.push(issue);
        }
    }

    pub fn into_result(self) -> Result<GraphReport> {
        if self.is_valid() {
            return Ok(self);
        }
        let reason = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(TaskpilotError::InvalidWorkflow {
            id: self.workflow_id,
            reason,
        })
    }
}

/// Borrowed, indexed view over a workflow's steps.
pub struct StepGraph<'a> {
    workflow: &'a Workflow,
    index: HashMap<&'a str, usize>,
}

impl<'a> StepGraph<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        let mut index = HashMap::with_capacity(workflow.steps.len());
        for (i, step) in workflow.steps.iter().enumerate() {
            // first occurrence wins; duplicates are reported by validate()
            index.entry(step.id.as_str()).or_insert(i);
        }
        Self { workflow, index }
    }

    pub fn entry(&self) -> Option<&'a WorkflowStep> {
        self.workflow.steps.first()
    }

    pub fn step(&self, id: &str) -> Option<&'a WorkflowStep> {
        self.index.get(id).map(|&i| &self.workflow.steps[i])
    }

    pub fn transition(&self, id: &str) -> Result<Transition<'a>> {
        let step = self.require(id)?;
        let next: Vec<&'a str> = step.next_steps.iter().map(String::as_str).collect();
        Ok(match (step.step_type, next.len()) {
            (_, 0) => Transition::Terminal,
            (StepType::Action, 1) => Transition::Linear(next[0]),
            (StepType::Action, _) => Transition::FanOut(next),
            (StepType::Condition, _) => Transition::Branch(next),
            (StepType::Loop, _) => Transition::Iterate(next),
        })
    }

    /// Resolved successors in `next_steps` order; dangling ids are skipped.
    pub fn successors(&self, id: &str) -> Result<Vec<&'a WorkflowStep>> {
        let step = self.require(id)?;
        Ok(step
            .next_steps
            .iter()
            .filter_map(|next| self.step(next))
            .collect())
    }

    pub fn predecessors(&self, id: &str) -> Result<Vec<&'a WorkflowStep>> {
        self.require(id)?;
        Ok(self
            .workflow
            .steps
            .iter()
            .filter(|s| s.next_steps.iter().any(|n| n == id))
            .collect())
    }

    pub fn is_terminal(&self, id: &str) -> Result<bool> {
        Ok(self.require(id)?.is_terminal())
    }

    /// Steps reachable from the entry, breadth-first, each visited once.
    pub fn reachable(&self) -> Vec<&'a WorkflowStep> {
        let Some(entry) = self.entry() else {
            return Vec::new();
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([entry]);
        seen.insert(entry.id.as_str());

        while let Some(step) = queue.pop_front() {
            order.push(step);
            for next in &step.next_steps {
                if let Some(target) = self.step(next) {
                    if seen.insert(target.id.as_str()) {
                        queue.push_back(target);
                    }
                }
            }
        }
        order
    }

    pub fn validate(&self) -> GraphReport {
        let mut report = GraphReport {
            workflow_id: self.workflow.id.clone(),
            ..Default::default()
        };

        let mut ids = HashSet::new();
        for step in &self.workflow.steps {
            if !ids.insert(step.id.as_str()) {
                report.push(GraphIssue::DuplicateStepId {
                    step_id: step.id.clone(),
                });
            }
        }

        for step in &self.workflow.steps {
            for target in &step.next_steps {
                if !self.index.contains_key(target.as_str()) {
                    report.push(GraphIssue::DanglingEdge {
                        step_id: step.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let reachable: HashSet<&str> = self.reachable().iter().map(|s| s.id.as_str()).collect();
        for step in &self.workflow.steps {
            if !reachable.contains(step.id.as_str()) {
                report.push(GraphIssue::UnreachableStep {
                    step_id: step.id.clone(),
                });
            }
        }

        for cycle in self.cycles() {
            let has_loop = cycle
                .iter()
                .filter_map(|id| self.step(id))
                .any(|s| s.step_type == StepType::Loop);
            if !has_loop {
                report.push(GraphIssue::CycleWithoutLoop { step_ids: cycle });
            }
        }

        report
    }

    /// One representative cycle per back edge found by depth-first search.
    fn cycles(&self) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let steps = &self.workflow.steps;
        let mut marks = vec![Mark::Unvisited; steps.len()];
        let mut cycles = Vec::new();

        for root in 0..steps.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            // (step index, next edge to explore)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::OnStack;

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let next_steps = &steps[node].next_steps;
                if top.1 >= next_steps.len() {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                }
                let target = next_steps[top.1].as_str();
                top.1 += 1;

                let Some(&t) = self.index.get(target) else {
                    continue;
                };
                match marks[t] {
                    Mark::Unvisited => {
                        marks[t] = Mark::OnStack;
                        stack.push((t, 0));
                    }
                    Mark::OnStack => {
                        let start = stack.iter().position(|&(n, _)| n == t).unwrap_or(0);
                        cycles.push(
                            stack[start..]
                                .iter()
                                .map(|&(n, _)| steps[n].id.clone())
                                .collect(),
                        );
                    }
                    Mark::Done => {}
                }
            }
        }
        cycles
    }

    fn require(&self, id: &str) -> Result<&'a WorkflowStep> {
        self.step(id)
            .ok_or_else(|| TaskpilotError::not_found("Workflow step", id))
    }
}

/// Validate a workflow's step graph.
pub fn validate_workflow(workflow: &Workflow) -> GraphReport {
    StepGraph::new(workflow).validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(steps: Vec<WorkflowStep>) -> Workflow {
        let mut workflow = Workflow::new("Test", "testing");
        workflow.id = "wf".to_string();
        workflow.steps = steps;
        workflow
    }

    fn linear() -> Workflow {
        workflow(vec![
            WorkflowStep::new("a", "A", StepType::Action).then("b"),
            WorkflowStep::new("b", "B", StepType::Condition)
                .then("c")
                .then("d"),
            WorkflowStep::new("c", "C", StepType::Action),
            WorkflowStep::new("d", "D", StepType::Action),
        ])
    }

    #[test]
    fn test_valid_graph_passes() {
        let wf = linear();
        let report = validate_workflow(&wf);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_dangling_edge_reports_step_and_target() {
        let mut wf = linear();
        wf.steps[2].next_steps.push("ghost".to_string());

        let report = validate_workflow(&wf);
        assert_eq!(
            report.errors,
            vec![GraphIssue::DanglingEdge {
                step_id: "c".to_string(),
                target: "ghost".to_string(),
            }]
        );
        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("step c points to missing step ghost"));
    }

    #[test]
    fn test_duplicate_step_id_is_error() {
        let wf = workflow(vec![
            WorkflowStep::new("a", "A", StepType::Action).then("b"),
            WorkflowStep::new("b", "B", StepType::Action),
            WorkflowStep::new("b", "B again", StepType::Action),
        ]);
        let report = validate_workflow(&wf);
        assert_eq!(
            report.errors,
            vec![GraphIssue::DuplicateStepId {
                step_id: "b".to_string()
            }]
        );
    }

    #[test]
    fn test_unreachable_step_is_warning() {
        let mut wf = linear();
        wf.steps.push(WorkflowStep::new("orphan", "Orphan", StepType::Action).then("d"));

        let report = validate_workflow(&wf);
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            vec![GraphIssue::UnreachableStep {
                step_id: "orphan".to_string()
            }]
        );
    }

    #[test]
    fn test_cycle_through_loop_is_allowed() {
        let wf = workflow(vec![
            WorkflowStep::new("start", "Start", StepType::Action).then("retry"),
            WorkflowStep::new("retry", "Retry", StepType::Loop)
                .then("work")
                .then("end"),
            WorkflowStep::new("work", "Work", StepType::Action).then("retry"),
            WorkflowStep::new("end", "End", StepType::Action),
        ]);
        let report = validate_workflow(&wf);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_cycle_without_loop_is_warning() {
        let wf = workflow(vec![
            WorkflowStep::new("a", "A", StepType::Action).then("b"),
            WorkflowStep::new("b", "B", StepType::Action).then("a"),
        ]);
        let report = validate_workflow(&wf);
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            vec![GraphIssue::CycleWithoutLoop {
                step_ids: vec!["a".to_string(), "b".to_string()]
            }]
        );
    }

    #[test]
    fn test_transitions_by_step_type() {
        let mut wf = linear();
        wf.steps.push(
            WorkflowStep::new("fan", "Fan", StepType::Action)
                .then("c")
                .then("d"),
        );
        let graph = StepGraph::new(&wf);

        assert_eq!(graph.transition("a").unwrap(), Transition::Linear("b"));
        assert_eq!(
            graph.transition("b").unwrap(),
            Transition::Branch(vec!["c", "d"])
        );
        assert_eq!(
            graph.transition("fan").unwrap(),
            Transition::FanOut(vec!["c", "d"])
        );
        assert_eq!(graph.transition("c").unwrap(), Transition::Terminal);
        assert!(graph.transition("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_entry_successors_and_predecessors() {
        let wf = linear();
        let graph = StepGraph::new(&wf);

        assert_eq!(graph.entry().map(|s| s.id.as_str()), Some("a"));
        let next: Vec<_> = graph
            .successors("b")
            .unwrap()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(next, vec!["c", "d"]);
        let prev: Vec<_> = graph
            .predecessors("d")
            .unwrap()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(prev, vec!["b"]);
        assert!(graph.is_terminal("d").unwrap());
        assert!(!graph.is_terminal("a").unwrap());
    }

    #[test]
    fn test_reachable_order_is_breadth_first_and_cycle_safe() {
        let wf = workflow(vec![
            WorkflowStep::new("a", "A", StepType::Action).then("b").then("c"),
            WorkflowStep::new("b", "B", StepType::Loop).then("a").then("d"),
            WorkflowStep::new("c", "C", StepType::Action),
            WorkflowStep::new("d", "D", StepType::Action),
        ]);
        let order: Vec<_> = StepGraph::new(&wf)
            .reachable()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_workflow() {
        let wf = workflow(vec![]);
        let graph = StepGraph::new(&wf);
        assert!(graph.entry().is_none());
        assert!(graph.reachable().is_empty());
        assert!(graph.validate().is_valid());
    }
}
