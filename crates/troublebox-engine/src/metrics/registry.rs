//! Central metrics registry for Troublebox

use super::collectors::TroubleboxMetrics;
use crate::error::Result;
use prometheus::Registry;
use std::sync::Arc;

/// Default namespace prepended to every metric name
pub const DEFAULT_PREFIX: &str = "troublebox";

/// Central metrics registry owning the Troublebox collectors
pub struct MetricsRegistry {
    registry: Arc<Registry>,
    metrics: TroubleboxMetrics,
}

impl MetricsRegistry {
    /// Create a new metrics registry with the default prefix
    pub fn new() -> Result<Self> {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    /// Create a new metrics registry with a custom prefix
    pub fn with_prefix(prefix: &str) -> Result<Self> {
        let registry = Arc::new(Registry::new_custom(Some(prefix.to_string()), None)?);
        let metrics = TroubleboxMetrics::new(&registry)?;

        Ok(Self { registry, metrics })
    }

    /// Get the Troublebox metrics
    pub fn troublebox(&self) -> &TroubleboxMetrics {
        &self.metrics
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String> {
        super::export_metrics(&self.registry)
    }

    /// Get the underlying registry for custom metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
