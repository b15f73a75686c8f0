//! Tumbling request-rate window

use prometheus::{Gauge, IntCounter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts requests in the current window and publishes the count as a rate
/// gauge when flushed.
#[derive(Debug)]
pub struct RequestRateWindow {
    current: AtomicU64,
    total: IntCounter,
    rate: Gauge,
}

impl RequestRateWindow {
    pub fn new(total: IntCounter, rate: Gauge) -> Self {
        Self {
            current: AtomicU64::new(0),
            total,
            rate,
        }
    }

    /// Count one request in the current window and in the lifetime total
    pub fn record(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
        self.total.inc();
    }

    /// Requests counted in the current window so far
    pub fn pending(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Close the current window: read and reset the count in one step and
    /// publish it on the rate gauge. Returns the published count.
    pub fn flush(&self) -> u64 {
        let count = self.current.swap(0, Ordering::AcqRel);
        self.rate.set(count as f64);
        count
    }
}
