//! Live system metrics shown on the monitor page.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub active_jobs: usize,
    pub queued_jobs: usize,
    /// Percent, 0..=100
    pub cpu_usage: f64,
    /// Percent, 0..=100
    pub memory_usage: f64,
    /// MB/s
    pub network_io: f64,
    /// MB/s
    pub disk_io: f64,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self {
            active_jobs: 3,
            queued_jobs: 7,
            cpu_usage: 45.0,
            memory_usage: 62.0,
            network_io: 1.2,
            disk_io: 0.8,
        }
    }
}

/// Produces the next metrics reading from the previous one.
pub trait MetricsSampler: Send + 'static {
    fn sample(&mut self, previous: &SystemMetrics) -> SystemMetrics;
}

impl<F> MetricsSampler for F
where
    F: FnMut(&SystemMetrics) -> SystemMetrics + Send + 'static,
{
    fn sample(&mut self, previous: &SystemMetrics) -> SystemMetrics {
        self(previous)
    }
}

/// Bounded random walk standing in for a real metrics source.
pub struct RandomWalkSampler<R = rand::rngs::StdRng> {
    rng: R,
}

impl RandomWalkSampler {
    pub fn new() -> Self {
        Self {
            rng: rand::SeedableRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: rand::SeedableRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomWalkSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send + 'static> MetricsSampler for RandomWalkSampler<R> {
    fn sample(&mut self, previous: &SystemMetrics) -> SystemMetrics {
        let mut jitter = |span: f64| (self.rng.gen::<f64>() - 0.5) * span;
        SystemMetrics {
            cpu_usage: (previous.cpu_usage + jitter(10.0)).clamp(0.0, 100.0),
            memory_usage: (previous.memory_usage + jitter(5.0)).clamp(0.0, 100.0),
            network_io: (previous.network_io + jitter(0.5)).max(0.0),
            disk_io: (previous.disk_io + jitter(0.3)).max(0.0),
            ..*previous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let mut sampler = RandomWalkSampler::seeded(7);
        let mut metrics = SystemMetrics {
            cpu_usage: 99.0,
            memory_usage: 1.0,
            network_io: 0.0,
            disk_io: 0.0,
            ..Default::default()
        };
        for _ in 0..500 {
            metrics = sampler.sample(&metrics);
            assert!((0.0..=100.0).contains(&metrics.cpu_usage));
            assert!((0.0..=100.0).contains(&metrics.memory_usage));
            assert!(metrics.network_io >= 0.0);
            assert!(metrics.disk_io >= 0.0);
        }
    }

    #[test]
    fn test_random_walk_step_size() {
        let mut sampler = RandomWalkSampler::seeded(42);
        let before = SystemMetrics::default();
        let after = sampler.sample(&before);
        assert!((after.cpu_usage - before.cpu_usage).abs() <= 5.0);
        assert!((after.memory_usage - before.memory_usage).abs() <= 2.5);
        assert_eq!(after.active_jobs, before.active_jobs);
    }

    #[test]
    fn test_closure_sampler() {
        let mut sampler = |m: &SystemMetrics| SystemMetrics {
            cpu_usage: m.cpu_usage + 1.0,
            ..*m
        };
        let next = MetricsSampler::sample(&mut sampler, &SystemMetrics::default());
        assert_eq!(next.cpu_usage, 46.0);
    }
}
