//! Long-lived background loops
//!
//! Every loop runs until the process exits. None of them is joined or
//! cancelled, and a failed iteration is logged before the next tick.

pub mod ambient;
pub mod disk_usage;
pub mod reconciler;

pub use ambient::AmbientTraffic;
pub use disk_usage::DiskUsageSampler;
pub use reconciler::{HostMetricsReconciler, ReconcileOutcome};

use crate::rate::RequestRateWindow;
use std::sync::Arc;
use tokio::time::{interval_at, Duration, Instant};

/// Flush the request-rate window once per `period`
pub async fn run_rate_window(window: Arc<RequestRateWindow>, period: Duration) {
    let mut interval = interval_at(Instant::now() + period, period);
    loop {
        interval.tick().await;
        let count = window.flush();
        tracing::trace!(count, "Request-rate window flushed");
    }
}
