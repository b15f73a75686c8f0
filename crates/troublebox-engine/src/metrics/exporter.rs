//! Metrics exporter for Prometheus scraping

use crate::error::Result;
use prometheus::{Encoder, Registry, TextEncoder};

/// Content type of the text exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Export metrics in Prometheus text format
pub fn export_metrics(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("exposition is not UTF-8: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::IntCounter;

    #[test]
    fn test_export_metrics() {
        let registry = Registry::new();
        let counter = IntCounter::new("test_counter", "A test counter").unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc_by(7);

        let output = export_metrics(&registry).unwrap();
        assert!(output.contains("# TYPE test_counter counter"));
        assert!(output.contains("test_counter 7"));
    }
}
