//! Synthetic memory allocator

use crate::intensity::{Intensity, IntensityRegistry};
use prometheus::Gauge;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Bytes allocated per intensity unit by a one-shot allocation
pub const ONE_SHOT_BYTES_PER_UNIT: f64 = 100_000.0;

/// Bytes retained per gauge unit by a sustained allocation
pub const SUSTAINED_BYTES_PER_UNIT: f64 = 500_000.0;

/// Interval between churn cycles of a sustained allocation
pub const CHURN_INTERVAL: Duration = Duration::from_millis(500);

/// Allocate a committed buffer of `bytes` bytes
fn committed_buffer(bytes: usize) -> Vec<u8> {
    // Non-zero fill so the pages are actually written, not lazily mapped.
    black_box(vec![0xA5u8; bytes])
}

/// Byte size of a one-shot allocation at `intensity`
pub fn one_shot_bytes(intensity: f64) -> usize {
    (intensity * ONE_SHOT_BYTES_PER_UNIT) as usize
}

/// Byte size of the buffer retained by a sustained allocation at `level`
pub fn sustained_bytes(level: Intensity) -> usize {
    (level.sustained_gauge() * SUSTAINED_BYTES_PER_UNIT) as usize
}

/// Allocate `intensity × 100 000` bytes, hold them for `hold`, then release.
/// Returns the number of bytes allocated. The gauge, when given, is set to
/// `intensity` before allocating.
pub fn allocate_once(intensity: f64, gauge: Option<&Gauge>, hold: Duration) -> usize {
    if let Some(gauge) = gauge {
        gauge.set(intensity);
    }
    let buffer = committed_buffer(one_shot_bytes(intensity));
    if !hold.is_zero() {
        thread::sleep(hold);
    }
    let bytes = buffer.len();
    drop(buffer);
    bytes
}

/// Hold a `multiplier × 10 × 500 000` byte buffer until `duration` elapses,
/// re-publishing the gauge under the registry lock and churning a small
/// one-shot allocation every [`CHURN_INTERVAL`]. Blocks the calling thread.
pub fn hold_sustained(
    level: Intensity,
    duration: Duration,
    registry: &IntensityRegistry,
    gauge: &Gauge,
    hold: Duration,
) -> usize {
    let deadline = Instant::now() + duration;
    let sustained_value = level.sustained_gauge();
    registry.publish(gauge, sustained_value);

    let main_block = committed_buffer(sustained_bytes(level));
    let bytes = main_block.len();

    loop {
        registry.publish(gauge, sustained_value);
        allocate_once(f64::from(level.multiplier()), None, hold);

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(CHURN_INTERVAL));
    }

    drop(main_block);
    bytes
}

/// Run [`hold_sustained`] on a detached thread and call `on_finish` after the
/// buffer is released.
pub fn allocate_sustained<F>(
    level: Intensity,
    duration: Duration,
    registry: Arc<IntensityRegistry>,
    gauge: Gauge,
    hold: Duration,
    on_finish: F,
) -> std::io::Result<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name("memory-sustained".to_string())
        .spawn(move || {
            let bytes = hold_sustained(level, duration, &registry, &gauge, hold);
            tracing::info!(level = %level, bytes, "Sustained memory load released");
            on_finish();
        })?;

    tracing::info!(
        level = %level,
        bytes = sustained_bytes(level),
        duration_ms = duration.as_millis() as u64,
        "Sustained memory load started"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge() -> Gauge {
        Gauge::new("test_memory", "test gauge").unwrap()
    }

    #[test]
    fn test_sizes() {
        assert_eq!(one_shot_bytes(1.0), 100_000);
        assert_eq!(one_shot_bytes(0.0005), 50);
        assert_eq!(sustained_bytes(Intensity::Normal), 5_000_000);
        assert_eq!(sustained_bytes(Intensity::Nightmare), 50_000_000);
    }

    #[test]
    fn test_allocate_once_updates_gauge_when_requested() {
        let gauge = gauge();
        assert_eq!(allocate_once(5.0, Some(&gauge), Duration::ZERO), 500_000);
        assert_eq!(gauge.get(), 5.0);

        gauge.set(42.0);
        allocate_once(1.0, None, Duration::ZERO);
        assert_eq!(gauge.get(), 42.0);
    }

    #[test]
    fn test_hold_sustained_keeps_gauge_elevated() {
        let gauge = gauge();
        let start = Instant::now();
        let bytes = hold_sustained(
            Intensity::Normal,
            Duration::from_millis(30),
            &IntensityRegistry::new(),
            &gauge,
            Duration::ZERO,
        );
        assert_eq!(bytes, 5_000_000);
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(gauge.get(), 10.0);
    }

    #[test]
    fn test_hold_sustained_restores_gauge_against_reconciler() {
        let gauge = gauge();
        let registry = Arc::new(IntensityRegistry::new());

        let holder = {
            let registry = registry.clone();
            let gauge = gauge.clone();
            thread::spawn(move || {
                hold_sustained(
                    Intensity::Hardcore,
                    Duration::from_millis(1_200),
                    &registry,
                    &gauge,
                    Duration::ZERO,
                )
            })
        };

        // A batch micro step lowers the gauge, then the host reconciler takes
        // it over with a real sample.
        thread::sleep(Duration::from_millis(100));
        registry.publish(&gauge, 0.0005);
        assert!(registry.arbitrate(&gauge, 10.0, 33.0));
        assert_eq!(gauge.get(), 33.0);

        // The next churn cycle puts the sustained value back.
        thread::sleep(CHURN_INTERVAL + Duration::from_millis(200));
        assert_eq!(gauge.get(), 50.0);
        assert!(!registry.arbitrate(&gauge, 10.0, 33.0));

        holder.join().unwrap();
        assert_eq!(gauge.get(), 50.0);
    }
}
