//! Order pipeline
//!
//! One order is the unit of synthetic work shared by batch dispatch and
//! ambient traffic: a micro CPU burn, a micro allocation, one disk write and
//! one recorded request.

use crate::error::Result;
use crate::intensity::{Intensity, IntensityRegistry};
use crate::metrics::TroubleboxMetrics;
use crate::rate::RequestRateWindow;
use crate::simulate::{allocate_once, burn_once, DiskWriter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Intensity of the CPU and memory step of a single order
pub const MICRO_INTENSITY: f64 = 0.0005;

/// Duration of the CPU step of a single order
pub const MICRO_BURN: Duration = Duration::from_micros(500);

/// Performs order units against the shared engine state
pub struct OrderPipeline {
    metrics: TroubleboxMetrics,
    intensity: Arc<IntensityRegistry>,
    rate: Arc<RequestRateWindow>,
    writer: Arc<DiskWriter>,
    churn_hold: Duration,
}

impl OrderPipeline {
    pub fn new(
        metrics: TroubleboxMetrics,
        intensity: Arc<IntensityRegistry>,
        rate: Arc<RequestRateWindow>,
        writer: Arc<DiskWriter>,
        churn_hold: Duration,
    ) -> Self {
        Self {
            metrics,
            intensity,
            rate,
            writer,
            churn_hold,
        }
    }

    pub fn metrics(&self) -> &TroubleboxMetrics {
        &self.metrics
    }

    /// Publish the multiplier of `mode` on both load gauges
    pub fn publish_level(&self, mode: Intensity) {
        let value = f64::from(mode.multiplier());
        self.intensity.publish(&self.metrics.cpu_load, value);
        self.intensity.publish(&self.metrics.memory_load, value);
    }

    /// Burn CPU for [`MICRO_BURN`] after publishing the micro intensity
    pub fn micro_cpu(&self) {
        self.intensity.publish(&self.metrics.cpu_load, MICRO_INTENSITY);
        burn_once(MICRO_BURN);
    }

    /// Allocate and release a micro buffer after publishing the micro intensity
    pub fn micro_memory(&self) {
        self.intensity.publish(&self.metrics.memory_load, MICRO_INTENSITY);
        allocate_once(MICRO_INTENSITY, None, self.churn_hold);
    }

    /// Write one order file for `mode`
    pub fn write(&self, mode: Intensity) -> Result<PathBuf> {
        self.writer.write_order(mode.as_str())
    }

    /// Run one full order unit. A failed write aborts the unit before the
    /// request is recorded.
    pub fn process(&self, mode: Intensity) -> Result<()> {
        self.micro_cpu();
        self.micro_memory();
        self.write(mode)?;
        self.rate.record();
        Ok(())
    }

    /// Run one ambient order unit. The CPU and memory steps only run while
    /// their gauge is below `low_traffic_threshold`, so an explicit load test
    /// is left alone.
    pub fn process_ambient(&self, mode: Intensity, low_traffic_threshold: f64) -> Result<()> {
        if self.metrics.cpu_load.get() < low_traffic_threshold {
            self.micro_cpu();
        }
        if self.metrics.memory_load.get() < low_traffic_threshold {
            self.micro_memory();
        }
        self.write(mode)?;
        self.rate.record();
        Ok(())
    }
}
