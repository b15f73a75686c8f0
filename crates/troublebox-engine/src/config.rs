//! Configuration for the load engine

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory receiving order files
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Worker threads per batch dispatch
    #[serde(default = "default_dispatch_workers")]
    pub dispatch_workers: usize,

    /// Duration of sustained CPU and memory tests
    #[serde(default = "default_sustained_duration")]
    pub sustained_duration_ms: u64,

    /// How long a one-shot allocation is held before release
    #[serde(default = "default_churn_hold")]
    pub churn_hold_ms: u64,

    /// Gauge value below which host samples overwrite synthetic values
    #[serde(default = "default_arbitration_threshold")]
    pub arbitration_threshold: f64,

    /// Request-rate window length
    #[serde(default = "default_one_second")]
    pub rate_window_ms: u64,

    /// Host metrics reconciliation interval
    #[serde(default = "default_one_second")]
    pub reconcile_interval_ms: u64,

    /// Disk usage sampling interval
    #[serde(default = "default_disk_sample_interval")]
    pub disk_sample_interval_ms: u64,

    /// Metric name prefix
    #[serde(default = "default_metrics_prefix")]
    pub metrics_prefix: String,

    /// Ambient traffic configuration
    #[serde(default)]
    pub ambient: AmbientConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            dispatch_workers: default_dispatch_workers(),
            sustained_duration_ms: default_sustained_duration(),
            churn_hold_ms: default_churn_hold(),
            arbitration_threshold: default_arbitration_threshold(),
            rate_window_ms: default_one_second(),
            reconcile_interval_ms: default_one_second(),
            disk_sample_interval_ms: default_disk_sample_interval(),
            metrics_prefix: default_metrics_prefix(),
            ambient: AmbientConfig::default(),
        }
    }
}

/// Ambient traffic configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientConfig {
    /// Run the ambient generator
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pause between cycles
    #[serde(default = "default_one_second")]
    pub interval_ms: u64,

    /// Upper bound of orders per cycle (lower bound is 1)
    #[serde(default = "default_max_orders_per_cycle")]
    pub max_orders_per_cycle: u32,

    /// Gauge value below which ambient orders also burn CPU and memory
    #[serde(default = "default_low_traffic_threshold")]
    pub low_traffic_threshold: f64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_one_second(),
            max_orders_per_cycle: default_max_orders_per_cycle(),
            low_traffic_threshold: default_low_traffic_threshold(),
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("orders")
}

fn default_dispatch_workers() -> usize {
    10
}

fn default_sustained_duration() -> u64 {
    60_000
}

fn default_churn_hold() -> u64 {
    10
}

fn default_arbitration_threshold() -> f64 {
    10.0
}

fn default_one_second() -> u64 {
    1_000
}

fn default_disk_sample_interval() -> u64 {
    5_000
}

fn default_metrics_prefix() -> String {
    crate::metrics::registry::DEFAULT_PREFIX.to_string()
}

fn default_max_orders_per_cycle() -> u32 {
    10
}

fn default_low_traffic_threshold() -> f64 {
    1.0
}

impl EngineConfig {
    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.dispatch_workers == 0 {
            return Err(EngineError::Config(
                "dispatch_workers must be at least 1".to_string(),
            ));
        }
        let intervals = [
            ("rate_window_ms", self.rate_window_ms),
            ("reconcile_interval_ms", self.reconcile_interval_ms),
            ("disk_sample_interval_ms", self.disk_sample_interval_ms),
            ("ambient.interval_ms", self.ambient.interval_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(EngineError::Config(format!("{name} must be non-zero")));
        }
        if self.ambient.max_orders_per_cycle == 0 {
            return Err(EngineError::Config(
                "ambient.max_orders_per_cycle must be at least 1".to_string(),
            ));
        }
        if self.metrics_prefix.is_empty() {
            return Err(EngineError::Config(
                "metrics_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sustained_duration(&self) -> Duration {
        Duration::from_millis(self.sustained_duration_ms)
    }

    pub fn churn_hold(&self) -> Duration {
        Duration::from_millis(self.churn_hold_ms)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms)
    }

    pub fn disk_sample_interval(&self) -> Duration {
        Duration::from_millis(self.disk_sample_interval_ms)
    }
}
