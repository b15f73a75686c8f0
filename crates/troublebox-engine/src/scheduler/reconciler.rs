//! Host metrics reconciler
//!
//! Publishes real host CPU and memory utilization on the load gauges, except
//! while a synthetic value at or above the arbitration threshold holds them.

use crate::host::{HostSample, HostSampler};
use crate::intensity::IntensityRegistry;
use prometheus::Gauge;
use std::sync::Arc;
use tokio::time::{interval_at, Duration, Instant};

/// Result of one reconciliation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileOutcome {
    pub sample: HostSample,
    pub cpu_overwritten: bool,
    pub memory_overwritten: bool,
}

/// Reconciles synthetic load gauges with real host measurements
pub struct HostMetricsReconciler {
    sampler: Box<dyn HostSampler>,
    intensity: Arc<IntensityRegistry>,
    cpu_load: Gauge,
    memory_load: Gauge,
    threshold: f64,
}

impl HostMetricsReconciler {
    pub fn new(
        sampler: Box<dyn HostSampler>,
        intensity: Arc<IntensityRegistry>,
        cpu_load: Gauge,
        memory_load: Gauge,
        threshold: f64,
    ) -> Self {
        Self {
            sampler,
            intensity,
            cpu_load,
            memory_load,
            threshold,
        }
    }

    /// Sample the host once and arbitrate both gauges
    pub fn tick(&mut self) -> ReconcileOutcome {
        let sample = self.sampler.sample();
        let cpu_overwritten = self
            .intensity
            .arbitrate(&self.cpu_load, self.threshold, sample.cpu_percent);
        let memory_overwritten = self
            .intensity
            .arbitrate(&self.memory_load, self.threshold, sample.memory_percent);

        tracing::trace!(
            cpu = sample.cpu_percent,
            memory = sample.memory_percent,
            cpu_overwritten,
            memory_overwritten,
            "Host metrics reconciled"
        );

        ReconcileOutcome {
            sample,
            cpu_overwritten,
            memory_overwritten,
        }
    }

    /// Reconcile every `period`, forever. The first tick waits a full period
    /// so CPU usage is measured over at least one interval.
    pub async fn run(mut self, period: Duration) {
        let mut interval = interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;
            self.tick();
        }
    }
}
