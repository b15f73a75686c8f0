//! Ambient traffic generator
//!
//! Keeps a small random trickle of orders flowing so the exported metrics are
//! never flat, without disturbing an explicit load test in progress.

use crate::config::AmbientConfig;
use crate::error::Result;
use crate::intensity::Intensity;
use crate::orders::OrderPipeline;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Produces random low-volume order traffic
#[derive(Clone)]
pub struct AmbientTraffic {
    pipeline: Arc<OrderPipeline>,
    config: AmbientConfig,
}

impl AmbientTraffic {
    pub fn new(pipeline: Arc<OrderPipeline>, config: AmbientConfig) -> Self {
        Self { pipeline, config }
    }

    /// Run one cycle of 1 to `max_orders_per_cycle` orders at random levels.
    /// Returns the number of orders produced; a failed write ends the cycle.
    pub fn cycle<R: Rng>(&self, rng: &mut R) -> Result<u32> {
        let count = rng.gen_range(1..=self.config.max_orders_per_cycle.max(1));
        for _ in 0..count {
            let mode = *Intensity::ALL.choose(rng).unwrap_or(&Intensity::Normal);
            self.pipeline
                .process_ambient(mode, self.config.low_traffic_threshold)?;
        }
        Ok(count)
    }

    /// Run cycles forever, pausing `interval_ms` between them. Each cycle
    /// runs on the blocking pool.
    pub async fn run(self) {
        let pause = Duration::from_millis(self.config.interval_ms);
        loop {
            let traffic = self.clone();
            let outcome =
                tokio::task::spawn_blocking(move || traffic.cycle(&mut rand::thread_rng())).await;
            match outcome {
                Ok(Ok(count)) => tracing::debug!(count, "Generated ambient orders"),
                Ok(Err(e)) => tracing::warn!(error = %e, "Ambient traffic cycle failed"),
                Err(e) => tracing::error!(error = %e, "Ambient traffic cycle panicked"),
            }
            sleep(pause).await;
        }
    }
}
