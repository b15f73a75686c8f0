//! Metrics collection and export for Troublebox
//!
//! Provides the Prometheus counters and gauges that load workers mutate and
//! that scrapers read through the exposition endpoint.

pub mod collectors;
pub mod exporter;
pub mod registry;

pub use collectors::TroubleboxMetrics;
pub use exporter::{export_metrics, CONTENT_TYPE};
pub use registry::MetricsRegistry;
