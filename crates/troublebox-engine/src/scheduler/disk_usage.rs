//! Disk usage sampler

use crate::error::{EngineError, Result};
use crate::host::DiskProbe;
use prometheus::Gauge;
use std::path::PathBuf;
use tokio::time::{interval, Duration};

/// Republishes the filesystem usage of the working directory as a gauge
pub struct DiskUsageSampler {
    probe: Box<dyn DiskProbe>,
    path: PathBuf,
    gauge: Gauge,
}

impl DiskUsageSampler {
    pub fn new(probe: Box<dyn DiskProbe>, path: impl Into<PathBuf>, gauge: Gauge) -> Self {
        Self {
            probe,
            path: path.into(),
            gauge,
        }
    }

    /// Query the filesystem once and publish the usage percentage. On error
    /// the gauge keeps its previous value.
    pub fn tick(&mut self) -> Result<f64> {
        let space = self.probe.space(&self.path)?;
        let percent = space.used_percent().ok_or_else(|| {
            EngineError::DiskQuery(format!(
                "filesystem holding {} reports zero capacity",
                self.path.display()
            ))
        })?;
        self.gauge.set(percent);
        Ok(percent)
    }

    /// Sample every `period`, forever
    pub async fn run(mut self, period: Duration) {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = self.tick() {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to compute disk usage"
                );
            }
        }
    }
}
