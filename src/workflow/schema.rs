//! Workflow data structures and serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open step configuration; its meaning is owned by the step type.
pub type StepConfig = serde_json::Map<String, serde_json::Value>;

/// A workflow definition: a named graph of automation steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// List order is irrelevant except that the first step is the entry.
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
            is_template: false,
            category: category.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn step(&self, id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Copy under a fresh id. Steps are deep-cloned and keep their ids,
    /// which are scoped to the new workflow.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("{} (copy)", self.name),
            description: self.description.clone(),
            steps: self.steps.clone(),
            is_template: false,
            category: self.category.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update. Does not touch `updated_at`; the store does that.
    pub fn apply(&mut self, patch: WorkflowPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(steps) = patch.steps {
            self.steps = steps;
        }
        if let Some(is_template) = patch.is_template {
            self.is_template = is_template;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}

/// Partial update for a [`Workflow`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<WorkflowStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A node in a workflow's execution graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Unique within the parent workflow only.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(default)]
    pub config: StepConfig,
    /// Ids of the steps this one transitions to. Empty means terminal.
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub position: Position,
}

impl WorkflowStep {
    pub fn new(id: impl Into<String>, name: impl Into<String>, step_type: StepType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            step_type,
            config: StepConfig::new(),
            next_steps: Vec::new(),
            position: Position::default(),
        }
    }

    pub fn then(mut self, next: impl Into<String>) -> Self {
        self.next_steps.push(next.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.next_steps.is_empty()
    }

    /// Typed view of the open config, keyed by step type.
    pub fn settings(&self) -> StepSettings<'_> {
        match self.step_type {
            StepType::Action => StepSettings::Action {
                config: &self.config,
            },
            StepType::Condition => StepSettings::Condition {
                expression: self.config.get("expression").and_then(|v| v.as_str()),
            },
            StepType::Loop => StepSettings::Loop {
                max_iterations: self.config.get("maxIterations").and_then(|v| v.as_u64()),
            },
        }
    }
}

/// Type-specific reading of a step's config.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSettings<'a> {
    /// Actions are interpreted by the executor; the map is passed through.
    Action { config: &'a StepConfig },
    Condition { expression: Option<&'a str> },
    Loop { max_iterations: Option<u64> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Action,
    Condition,
    Loop,
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepType::Action => "action",
            StepType::Condition => "condition",
            StepType::Loop => "loop",
        };
        write!(f, "{}", s)
    }
}

/// Editor canvas coordinate. Cosmetic only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Workflow {
        let mut workflow = Workflow::new("Deploy", "deployment");
        workflow.steps = vec![
            WorkflowStep::new("step-1", "Build", StepType::Action)
                .with_config("target", json!("production"))
                .then("step-2"),
            WorkflowStep::new("step-2", "Tests pass?", StepType::Condition)
                .with_config("expression", json!("tests.passed"))
                .then("step-3")
                .then("step-4"),
            WorkflowStep::new("step-3", "Ship", StepType::Action),
            WorkflowStep::new("step-4", "Notify", StepType::Action),
        ];
        workflow
    }

    #[test]
    fn test_workflow_wire_format() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["steps"][1]["type"], "condition");
        assert_eq!(json["steps"][1]["nextSteps"], json!(["step-3", "step-4"]));
        assert_eq!(json["isTemplate"], false);
    }

    #[test]
    fn test_step_defaults_when_missing() {
        let step: WorkflowStep =
            serde_json::from_value(json!({ "id": "s", "name": "S", "type": "loop" })).unwrap();
        assert!(step.config.is_empty());
        assert!(step.is_terminal());
        assert_eq!(step.position, Position::default());
    }

    #[test]
    fn test_settings_by_type() {
        let workflow = sample();
        assert_eq!(
            workflow.steps[1].settings(),
            StepSettings::Condition {
                expression: Some("tests.passed")
            }
        );
        let looping = WorkflowStep::new("l", "Retry", StepType::Loop)
            .with_config("maxIterations", json!(3));
        assert_eq!(
            looping.settings(),
            StepSettings::Loop {
                max_iterations: Some(3)
            }
        );
    }

    #[test]
    fn test_duplicate_is_deep_copy() {
        let mut original = sample();
        original.is_template = true;
        let mut copy = original.duplicate();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Deploy (copy)");
        assert!(!copy.is_template);
        assert_eq!(copy.steps, original.steps);
        assert!(copy.created_at >= original.created_at);

        copy.steps[0].name = "Build (changed)".to_string();
        copy.steps[0].next_steps.clear();
        assert_eq!(original.steps[0].name, "Build");
        assert_eq!(original.steps[0].next_steps, vec!["step-2".to_string()]);
    }

    #[test]
    fn test_apply_patch() {
        let mut workflow = sample();
        workflow.apply(WorkflowPatch {
            is_template: Some(true),
            steps: Some(vec![]),
            ..Default::default()
        });
        assert!(workflow.is_template);
        assert!(workflow.steps.is_empty());
        assert_eq!(workflow.name, "Deploy");
    }
}
