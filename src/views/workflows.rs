//! Workflow library filtering.

use crate::views::filter::contains_ignore_case;
use crate::workflow::Workflow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFilters {
    #[serde(default)]
    pub search: String,
    /// `None` shows every category.
    #[serde(default)]
    pub category: Option<String>,
    /// Templates tab.
    #[serde(default)]
    pub templates_only: bool,
}

pub fn filtered_workflows(workflows: &[Workflow], filters: &WorkflowFilters) -> Vec<Workflow> {
    let needle = filters.search.to_lowercase();
    workflows
        .iter()
        .filter(|w| {
            (contains_ignore_case(&w.name, &needle) || contains_ignore_case(&w.description, &needle))
                && filters.category.as_ref().map_or(true, |c| &w.category == c)
                && (!filters.templates_only || w.is_template)
        })
        .cloned()
        .collect()
}

/// Distinct non-empty categories, sorted.
pub fn workflow_categories(workflows: &[Workflow]) -> Vec<String> {
    workflows
        .iter()
        .filter(|w| !w.category.is_empty())
        .map(|w| w.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
