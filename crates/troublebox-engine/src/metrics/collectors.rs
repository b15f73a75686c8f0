//! Troublebox metric collectors

use crate::error::Result;
use prometheus::{Gauge, IntCounter, Opts, Registry};

/// All Troublebox metrics combined
#[derive(Clone)]
pub struct TroubleboxMetrics {
    /// Orders processed (lifetime request total)
    pub orders_total: IntCounter,

    /// Simulated or real CPU load
    pub cpu_load: Gauge,

    /// Simulated or real memory load
    pub memory_load: Gauge,

    /// Order files written to disk
    pub disk_files_written: IntCounter,

    /// Filesystem usage of the working directory, in percent
    pub disk_usage_percent: Gauge,

    /// Orders recorded during the last rate window
    pub requests_per_second: Gauge,
}

impl TroubleboxMetrics {
    /// Create all metrics and register them
    pub fn new(registry: &Registry) -> Result<Self> {
        let orders_total = IntCounter::with_opts(Opts::new(
            "orders_total",
            "Total orders processed",
        ))?;
        registry.register(Box::new(orders_total.clone()))?;

        let cpu_load = Gauge::with_opts(Opts::new("cpu_load", "Simulated CPU load"))?;
        registry.register(Box::new(cpu_load.clone()))?;

        let memory_load = Gauge::with_opts(Opts::new("memory_load", "Simulated memory usage"))?;
        registry.register(Box::new(memory_load.clone()))?;

        // Name predates the counter type; dashboards scrape it as-is.
        let disk_files_written = IntCounter::with_opts(Opts::new(
            "disk_usage",
            "Simulated disk usage (files created)",
        ))?;
        registry.register(Box::new(disk_files_written.clone()))?;

        let disk_usage_percent = Gauge::with_opts(Opts::new(
            "disk_usage_percent",
            "Real usage percentage of the orders volume",
        ))?;
        registry.register(Box::new(disk_usage_percent.clone()))?;

        let requests_per_second = Gauge::with_opts(Opts::new(
            "rps",
            "Simulated orders per second (all sources)",
        ))?;
        registry.register(Box::new(requests_per_second.clone()))?;

        Ok(Self {
            orders_total,
            cpu_load,
            memory_load,
            disk_files_written,
            disk_usage_percent,
            requests_per_second,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once() {
        let registry = Registry::new();
        let metrics = TroubleboxMetrics::new(&registry).unwrap();
        metrics.orders_total.inc();
        metrics.cpu_load.set(3.5);

        assert_eq!(registry.gather().len(), 6);
        assert!(TroubleboxMetrics::new(&registry).is_err());
    }
}
