//! Workflows: named graphs of automation steps.

pub mod graph;
pub mod schema;

pub use graph::{validate_workflow, GraphIssue, GraphReport, StepGraph, Transition};
pub use schema::*;
