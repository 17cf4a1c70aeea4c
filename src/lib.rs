pub mod agent;
pub mod config;
pub mod error;
pub mod execution;
pub mod fixtures;
pub mod monitor;
pub mod store;
pub mod task;
pub mod views;
pub mod workflow;

use monitor::{spawn_refresh, RandomWalkSampler};
use std::sync::Arc;
use std::time::Duration;
use store::Store;

/// Boot the store headless: load config, seed demo data, lint workflows and
/// keep the metrics refresh running until Ctrl-C.
pub async fn run() -> error::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration (never overwrite an existing file on failure)
    let config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {}. Using in-memory defaults (not saving).", e);
            config::AppConfig::default()
        }
    };
    if let Err(e) = config::validate_system_config(&config.system) {
        tracing::warn!("System config is invalid: {}", e);
    }
    let monitor_settings = match config::validate_monitor_settings(&config.monitor) {
        Ok(()) => config.monitor.clone(),
        Err(e) => {
            tracing::warn!("{}. Using default monitor settings.", e);
            config::MonitorSettings::default()
        }
    };

    let store = Arc::new(Store::with_system_config(
        config.store,
        config.system.clone(),
    ));
    fixtures::seed_if_empty(&store);
    store.prune_execution_logs(chrono::Utc::now());

    let integrity = store.check_references();
    for reference in &integrity.dangling {
        tracing::warn!(
            "Task {} references missing {} {}",
            reference.task_id,
            reference.field,
            reference.target
        );
    }
    for report in &integrity.workflows {
        for issue in report.errors.iter().chain(&report.warnings) {
            tracing::warn!("Workflow {}: {}", report.workflow_id, issue);
        }
    }

    let stats = store.task_stats();
    tracing::info!(
        "Dashboard: {} tasks ({} running, {} succeeded, {} failed, {} pending)",
        stats.total,
        stats.running,
        stats.success,
        stats.failed,
        stats.pending
    );
    let logs = views::execution_stats(&store.execution_logs());
    tracing::info!(
        "Executions: {} total, {} running, {}% success rate",
        logs.total,
        logs.running,
        logs.success_rate
    );

    let refresh = spawn_refresh(
        Arc::clone(&store),
        Duration::from_millis(monitor_settings.refresh_interval_ms),
        RandomWalkSampler::new(),
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    refresh.stop();

    let metrics = store.metrics();
    tracing::info!(
        "Last metrics: cpu={:.1}% mem={:.1}% active={} queued={}",
        metrics.cpu_usage,
        metrics.memory_usage,
        metrics.active_jobs,
        metrics.queued_jobs
    );
    Ok(())
}
