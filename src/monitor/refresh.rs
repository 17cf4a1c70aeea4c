//! Periodic metrics refresh bound to a cancellable handle.

use crate::monitor::metrics::MetricsSampler;
use crate::store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns a running refresh loop. Dropping the handle stops the loop, so a view
/// that goes away can never keep writing to the store.
pub struct RefreshHandle {
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Shortest period the loop will tick at.
pub const MIN_REFRESH_PERIOD: Duration = Duration::from_millis(1);

/// Refresh the store's metrics every `period`. Must be called within a tokio runtime.
/// Periods below [`MIN_REFRESH_PERIOD`] are raised to it.
pub fn spawn_refresh<S>(store: Arc<Store>, period: Duration, mut sampler: S) -> RefreshHandle
where
    S: MetricsSampler,
{
    let period = if period < MIN_REFRESH_PERIOD {
        tracing::warn!(
            "Metrics refresh period {:?} is too short, using {:?}",
            period,
            MIN_REFRESH_PERIOD
        );
        MIN_REFRESH_PERIOD
    } else {
        period
    };
    tracing::debug!("Starting metrics refresh every {:?}", period);
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let metrics = store.refresh_metrics(&mut sampler);
            tracing::trace!(
                "Metrics refreshed: cpu={:.1}% mem={:.1}% active={} queued={}",
                metrics.cpu_usage,
                metrics.memory_usage,
                metrics.active_jobs,
                metrics.queued_jobs
            );
        }
    });
    RefreshHandle { handle }
}
