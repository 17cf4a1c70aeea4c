//! The domain store: single owner of every collection the dashboard shows.
//!
//! Each method takes the lock for its whole duration, so every operation is
//! atomic and later reads observe earlier writes in issue order. Reads hand
//! out owned copies; nothing outside the store holds a reference into it.

pub mod collection;
pub mod integrity;
pub mod snapshot;

pub use collection::{Collection, Entity, Patchable, Placement};
pub use integrity::{DanglingReference, IntegrityReport};
pub use snapshot::{load_snapshot, save_snapshot, SeedReport, StoreSnapshot};

use crate::agent::Agent;
use crate::config::{ReferentialIntegrity, StoreSettings, SystemConfig, SystemConfigPatch};
use crate::error::{Result, TaskpilotError};
use crate::execution::{ExecutionLog, ExecutionOutcome, ExecutionStatus};
use crate::monitor::{MetricsSampler, SystemMetrics};
use crate::task::{Task, TaskPatch, TaskStatus};
use crate::views::{self, TaskFilters, TaskFiltersPatch, TaskStats};
use crate::workflow::{validate_workflow, Workflow, WorkflowPatch};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

const DEFAULT_PAGE: &str = "dashboard";

struct StoreState {
    tasks: Collection<Task>,
    agents: Collection<Agent>,
    workflows: Collection<Workflow>,
    execution_logs: Collection<ExecutionLog>,
    task_filters: TaskFilters,
    system_config: SystemConfig,
    metrics: SystemMetrics,
    sidebar_collapsed: bool,
    current_page: String,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            tasks: Collection::default(),
            agents: Collection::default(),
            workflows: Collection::default(),
            execution_logs: Collection::default(),
            task_filters: TaskFilters::default(),
            system_config: SystemConfig::default(),
            metrics: SystemMetrics::default(),
            sidebar_collapsed: false,
            current_page: DEFAULT_PAGE.to_string(),
        }
    }
}

pub struct Store {
    settings: StoreSettings,
    state: RwLock<StoreState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreSettings::default())
    }
}

impl Store {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn with_system_config(settings: StoreSettings, system_config: SystemConfig) -> Self {
        let store = Self::new(settings);
        store.state.write().system_config = system_config;
        store
    }

    fn strict(&self) -> bool {
        self.settings.integrity == ReferentialIntegrity::Strict
    }

    // ==================== Tasks ====================

    pub fn tasks(&self) -> Vec<Task> {
        self.state.read().tasks.items().to_vec()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.state.read().tasks.get(id).cloned()
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        tracing::debug!("Replacing task list ({} tasks)", tasks.len());
        self.state.write().tasks.set_all(tasks);
    }

    pub fn add_task(&self, task: Task) -> Result<()> {
        let mut state = self.state.write();
        if self.strict() {
            integrity::check_task(&state.agents, &state.workflows, &task)?;
        }
        let id = task.id.clone();
        state
            .tasks
            .insert(task, self.settings.duplicate_ids, Placement::Append)
            .inspect_err(|e| tracing::warn!("Rejected task {}: {}", id, e))?;
        tracing::debug!("Added task {}", id);
        Ok(())
    }

    /// Merge `patch` into the task and refresh `updated_at`.
    pub fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let mut state = self.state.write();
        self.update_task_in(&mut state, id, patch)
    }

    /// Dashboard play/pause: running tasks pause, everything else starts running.
    /// The current status is read and flipped under the same write lock.
    pub fn toggle_task_status(&self, id: &str) -> Result<Task> {
        let mut state = self.state.write();
        let status = state
            .tasks
            .get(id)
            .ok_or_else(|| TaskpilotError::not_found(Task::KIND, id))?
            .status
            .toggled();
        self.update_task_in(&mut state, id, TaskPatch::status(status))
    }

    fn update_task_in(&self, state: &mut StoreState, id: &str, patch: TaskPatch) -> Result<Task> {
        if self.strict() && patch.touches_references() {
            if let Some(current) = state.tasks.get(id) {
                let mut candidate = current.clone();
                candidate.apply(patch.clone());
                integrity::check_task(&state.agents, &state.workflows, &candidate)?;
            }
        }
        let task = state.tasks.update(id, patch, Utc::now())?.clone();
        tracing::debug!("Updated task {}", id);
        Ok(task)
    }

    pub fn remove_task(&self, id: &str) -> Result<Task> {
        let task = self.state.write().tasks.remove(id)?;
        tracing::debug!("Removed task {}", id);
        Ok(task)
    }

    pub fn set_selected_task(&self, task: Option<&Task>) {
        self.state.write().tasks.select(task);
    }

    pub fn selected_task(&self) -> Option<Task> {
        self.state.read().tasks.selected().cloned()
    }

    pub fn task_filters(&self) -> TaskFilters {
        self.state.read().task_filters.clone()
    }

    pub fn set_task_filters(&self, patch: TaskFiltersPatch) {
        let mut state = self.state.write();
        state.task_filters.merge(patch);
        tracing::debug!(
            "Task filters: status={} priority={} search={:?}",
            state.task_filters.status.as_str(),
            state.task_filters.priority.as_str(),
            state.task_filters.search
        );
    }

    /// Tasks matching the current filters, recomputed on every call.
    pub fn filtered_tasks(&self) -> Vec<Task> {
        let state = self.state.read();
        views::filtered_tasks(state.tasks.items(), &state.task_filters)
    }

    pub fn task_stats(&self) -> TaskStats {
        views::task_stats(self.state.read().tasks.items())
    }

    // ==================== Agents ====================

    pub fn agents(&self) -> Vec<Agent> {
        self.state.read().agents.items().to_vec()
    }

    pub fn set_agents(&self, agents: Vec<Agent>) {
        tracing::debug!("Replacing agent list ({} agents)", agents.len());
        self.state.write().agents.set_all(agents);
    }

    pub fn set_selected_agent(&self, agent: Option<&Agent>) {
        self.state.write().agents.select(agent);
    }

    pub fn selected_agent(&self) -> Option<Agent> {
        self.state.read().agents.selected().cloned()
    }

    // ==================== Workflows ====================

    pub fn workflows(&self) -> Vec<Workflow> {
        self.state.read().workflows.items().to_vec()
    }

    pub fn workflow(&self, id: &str) -> Option<Workflow> {
        self.state.read().workflows.get(id).cloned()
    }

    pub fn set_workflows(&self, workflows: Vec<Workflow>) {
        tracing::debug!("Replacing workflow list ({} workflows)", workflows.len());
        self.state.write().workflows.set_all(workflows);
    }

    pub fn add_workflow(&self, workflow: Workflow) -> Result<()> {
        if self.strict() {
            validate_workflow(&workflow).into_result()?;
        }
        let id = workflow.id.clone();
        self.state
            .write()
            .workflows
            .insert(workflow, self.settings.duplicate_ids, Placement::Append)
            .inspect_err(|e| tracing::warn!("Rejected workflow {}: {}", id, e))?;
        tracing::debug!("Added workflow {}", id);
        Ok(())
    }

    pub fn update_workflow(&self, id: &str, patch: WorkflowPatch) -> Result<Workflow> {
        let mut state = self.state.write();
        if self.strict() && patch.steps.is_some() {
            if let Some(current) = state.workflows.get(id) {
                let mut candidate = current.clone();
                candidate.apply(patch.clone());
                validate_workflow(&candidate).into_result()?;
            }
        }
        let workflow = state.workflows.update(id, patch, Utc::now())?.clone();
        tracing::debug!("Updated workflow {}", id);
        Ok(workflow)
    }

    /// Add a deep copy of the workflow under a fresh id and return it.
    pub fn duplicate_workflow(&self, id: &str) -> Result<Workflow> {
        let mut state = self.state.write();
        let copy = state
            .workflows
            .get(id)
            .ok_or_else(|| TaskpilotError::not_found(Workflow::KIND, id))?
            .duplicate();
        state
            .workflows
            .insert(copy.clone(), self.settings.duplicate_ids, Placement::Append)?;
        tracing::debug!("Duplicated workflow {} as {}", id, copy.id);
        Ok(copy)
    }

    pub fn remove_workflow(&self, id: &str) -> Result<Workflow> {
        let workflow = self.state.write().workflows.remove(id)?;
        tracing::debug!("Removed workflow {}", id);
        Ok(workflow)
    }

    pub fn set_selected_workflow(&self, workflow: Option<&Workflow>) {
        self.state.write().workflows.select(workflow);
    }

    pub fn selected_workflow(&self) -> Option<Workflow> {
        self.state.read().workflows.selected().cloned()
    }

    // ==================== Execution logs ====================

    /// Most recent first.
    pub fn execution_logs(&self) -> Vec<ExecutionLog> {
        self.state.read().execution_logs.items().to_vec()
    }

    pub fn set_execution_logs(&self, logs: Vec<ExecutionLog>) {
        tracing::debug!("Replacing execution logs ({} entries)", logs.len());
        self.state.write().execution_logs.set_all(logs);
    }

    /// Prepend a log so the collection stays most-recent-first.
    pub fn add_execution_log(&self, log: ExecutionLog) -> Result<()> {
        let id = log.id.clone();
        self.state
            .write()
            .execution_logs
            .insert(log, self.settings.duplicate_ids, Placement::Prepend)
            .inspect_err(|e| tracing::warn!("Rejected execution log {}: {}", id, e))?;
        tracing::debug!("Added execution log {}", id);
        Ok(())
    }

    /// Move a running log to its terminal status.
    pub fn finish_execution_log(&self, id: &str, outcome: ExecutionOutcome) -> Result<ExecutionLog> {
        let mut state = self.state.write();
        let log = state
            .execution_logs
            .get_mut(id)
            .ok_or_else(|| TaskpilotError::not_found(ExecutionLog::KIND, id))?;
        log.finish(outcome, Utc::now())?;
        tracing::debug!("Execution log {} finished as {}", id, log.status);
        Ok(log.clone())
    }

    pub fn remove_execution_log(&self, id: &str) -> Result<ExecutionLog> {
        let log = self.state.write().execution_logs.remove(id)?;
        tracing::debug!("Removed execution log {}", id);
        Ok(log)
    }

    /// Drop logs that started more than `performance.log_retention_days`
    /// before `now`. Returns the removed logs.
    pub fn prune_execution_logs(&self, now: DateTime<Utc>) -> Vec<ExecutionLog> {
        let mut state = self.state.write();
        let days = state.system_config.performance.log_retention_days;
        let cutoff = now - Duration::days(i64::from(days));
        let removed = state
            .execution_logs
            .remove_where(|log| log.start_time < cutoff);
        if !removed.is_empty() {
            tracing::info!(
                "Pruned {} execution logs older than {} days",
                removed.len(),
                days
            );
        }
        removed
    }

    // ==================== System config & UI ====================

    pub fn system_config(&self) -> SystemConfig {
        self.state.read().system_config.clone()
    }

    pub fn update_system_config(&self, patch: SystemConfigPatch) -> SystemConfig {
        let mut state = self.state.write();
        state.system_config.merge(patch);
        state.system_config.clone()
    }

    pub fn reset_system_config(&self) -> SystemConfig {
        let mut state = self.state.write();
        state.system_config.reset();
        state.system_config.clone()
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.state.read().sidebar_collapsed
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        self.state.write().sidebar_collapsed = collapsed;
    }

    pub fn current_page(&self) -> String {
        self.state.read().current_page.clone()
    }

    pub fn set_current_page(&self, page: impl Into<String>) {
        self.state.write().current_page = page.into();
    }

    // ==================== Metrics ====================

    pub fn metrics(&self) -> SystemMetrics {
        self.state.read().metrics
    }

    /// One read-modify-write of the live metrics. Job counts come from the
    /// store itself: running logs are active, pending tasks are queued.
    pub fn refresh_metrics<S: MetricsSampler + ?Sized>(&self, sampler: &mut S) -> SystemMetrics {
        let mut state = self.state.write();
        let mut next = sampler.sample(&state.metrics);
        if !state.execution_logs.is_empty() || !state.tasks.is_empty() {
            next.active_jobs = state
                .execution_logs
                .items()
                .iter()
                .filter(|l| l.status == ExecutionStatus::Running)
                .count();
            next.queued_jobs = state
                .tasks
                .items()
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .count();
        }
        state.metrics = next;
        next
    }

    // ==================== Integrity & snapshots ====================

    /// Dangling foreign keys and step-graph issues across the whole store.
    pub fn check_references(&self) -> IntegrityReport {
        let state = self.state.read();
        integrity::check_all(state.tasks.items(), &state.agents, &state.workflows)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        StoreSnapshot {
            tasks: state.tasks.items().to_vec(),
            agents: state.agents.items().to_vec(),
            workflows: state.workflows.items().to_vec(),
            execution_logs: state.execution_logs.items().to_vec(),
            system_config: state.system_config.clone(),
        }
    }

    /// Fill each collection that is currently empty from `seed`, leaving
    /// populated ones alone. The system config is not touched.
    pub fn seed_empty(&self, seed: StoreSnapshot) -> SeedReport {
        let mut state = self.state.write();
        let mut report = SeedReport::default();
        if state.tasks.is_empty() {
            report.tasks = seed.tasks.len();
            state.tasks.set_all(seed.tasks);
        }
        if state.agents.is_empty() {
            report.agents = seed.agents.len();
            state.agents.set_all(seed.agents);
        }
        if state.workflows.is_empty() {
            report.workflows = seed.workflows.len();
            state.workflows.set_all(seed.workflows);
        }
        if state.execution_logs.is_empty() {
            report.execution_logs = seed.execution_logs.len();
            state.execution_logs.set_all(seed.execution_logs);
        }
        report
    }

    /// Replace every collection and the system config with the snapshot's.
    pub fn restore(&self, snapshot: StoreSnapshot) {
        let mut state = self.state.write();
        state.tasks.set_all(snapshot.tasks);
        state.agents.set_all(snapshot.agents);
        state.workflows.set_all(snapshot.workflows);
        state.execution_logs.set_all(snapshot.execution_logs);
        state.system_config = snapshot.system_config;
        tracing::info!(
            "Restored snapshot: {} tasks, {} workflows, {} logs",
            state.tasks.len(),
            state.workflows.len(),
            state.execution_logs.len()
        );
    }
}
