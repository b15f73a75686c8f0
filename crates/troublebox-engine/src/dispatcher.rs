//! Batch order dispatcher

use crate::error::{EngineError, Result};
use crate::intensity::Intensity;
use crate::orders::OrderPipeline;
use serde::Serialize;
use std::io;
use std::ops::Range;
use std::sync::Arc;
use std::thread;

/// Orders between progress log lines
const PROGRESS_EVERY: u64 = 1_000;

/// Split `total` order indices into `workers` contiguous shares of
/// `total / workers` each, the last share absorbing the remainder.
pub fn partition(total: u64, workers: usize) -> Vec<Range<u64>> {
    let workers = workers.max(1) as u64;
    let batch = total / workers;
    (0..workers)
        .map(|w| {
            let start = w * batch;
            let end = if w < workers - 1 { (w + 1) * batch } else { total };
            start..end
        })
        .collect()
}

/// What a dispatch scheduled
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub mode: Intensity,
    pub scheduled: u64,
    pub shares: Vec<Range<u64>>,
}

/// Fans batch orders out across a fixed worker pool
pub struct Dispatcher {
    pipeline: Arc<OrderPipeline>,
    workers: usize,
}

impl Dispatcher {
    pub fn new(pipeline: Arc<OrderPipeline>, workers: usize) -> Self {
        Self { pipeline, workers }
    }

    /// Start one detached worker per share, then publish the level on the
    /// load gauges. Returns without waiting for any order to complete.
    pub fn dispatch(&self, mode: Intensity) -> Result<DispatchReceipt> {
        self.dispatch_with(mode, spawn_worker)
    }

    fn dispatch_with<S>(&self, mode: Intensity, mut spawn: S) -> Result<DispatchReceipt>
    where
        S: FnMut(String, Job) -> io::Result<()>,
    {
        let scheduled = mode.order_count();
        let shares = partition(scheduled, self.workers);
        let mut started = 0;
        let mut last_error = None;
        for (index, share) in shares.iter().cloned().enumerate() {
            let pipeline = self.pipeline.clone();
            let job: Job = Box::new(move || run_share(&pipeline, mode, share, scheduled));
            match spawn(format!("order-worker-{index}"), job) {
                Ok(()) => started += 1,
                Err(e) => {
                    tracing::error!(
                        mode = %mode,
                        worker = index,
                        error = %e,
                        "Failed to start order worker"
                    );
                    last_error = Some(e);
                }
            }
        }

        if started == 0 {
            return Err(match last_error {
                Some(e) => EngineError::Io(e),
                None => EngineError::Config("no order workers configured".to_string()),
            });
        }
        self.pipeline.publish_level(mode);

        tracing::info!(
            mode = %mode,
            scheduled,
            workers = started,
            "Dispatched batch orders"
        );

        Ok(DispatchReceipt {
            mode,
            scheduled,
            shares,
        })
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

fn spawn_worker(name: String, job: Job) -> io::Result<()> {
    thread::Builder::new().name(name).spawn(job).map(drop)
}

fn run_share(pipeline: &OrderPipeline, mode: Intensity, share: Range<u64>, scheduled: u64) {
    for index in share.clone() {
        if index % PROGRESS_EVERY == 0 {
            tracing::debug!(mode = %mode, order = index, scheduled, "Processing batch orders");
        }
        if let Err(e) = pipeline.process(mode) {
            tracing::error!(
                mode = %mode,
                order = index,
                remaining = share.end - index,
                error = %e,
                "Order worker aborted"
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intensity::{Resource, BASELINE_INTENSITY};
    use crate::orders::tests::fixture;
    use proptest::prelude::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_partition_last_worker_absorbs_remainder() {
        let shares = partition(105, 10);
        assert_eq!(shares.len(), 10);
        assert_eq!(shares[0], 0..10);
        assert_eq!(shares[8], 80..90);
        assert_eq!(shares[9], 90..105);
    }

    #[test]
    fn test_partition_fewer_orders_than_workers() {
        let shares = partition(3, 10);
        assert!(shares[..9].iter().all(|s| s.is_empty()));
        assert_eq!(shares[9], 0..3);
    }

    proptest! {
        #[test]
        fn prop_partition_covers_every_index_once(
            total in 0u64..50_000,
            workers in 1usize..64,
        ) {
            let shares = partition(total, workers);
            prop_assert_eq!(shares.len(), workers);

            let mut next = 0;
            for share in &shares {
                prop_assert_eq!(share.start, next);
                prop_assert!(share.end >= share.start);
                next = share.end;
            }
            prop_assert_eq!(next, total);
            prop_assert_eq!(shares.iter().map(|s| s.end - s.start).sum::<u64>(), total);
        }
    }

    #[test]
    fn test_dispatch_returns_immediately_and_completes() {
        let fx = fixture();
        let dispatcher = Dispatcher::new(fx.pipeline.clone(), 10);
        let metrics = fx.registry.troublebox();

        let receipt = dispatcher.dispatch(Intensity::Normal).unwrap();
        assert_eq!(receipt.scheduled, 100);
        assert_eq!(receipt.shares.len(), 10);

        let deadline = Instant::now() + Duration::from_secs(30);
        while metrics.orders_total.get() < 100 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(metrics.orders_total.get(), 100);
        assert_eq!(metrics.disk_files_written.get(), 100);
        assert_eq!(std::fs::read_dir(fx.dir.path()).unwrap().count(), 100);
        // Batch orders move the gauges, not the sustained-load registry.
        assert_eq!(fx.intensity.get(Resource::Cpu), BASELINE_INTENSITY);
    }

    #[test]
    fn test_dispatch_leaves_gauges_alone_when_no_worker_starts() {
        let fx = fixture();
        let dispatcher = Dispatcher::new(fx.pipeline.clone(), 4);
        let metrics = fx.registry.troublebox();

        let result = dispatcher.dispatch_with(Intensity::Nightmare, |_, _| {
            Err(io::Error::other("thread limit reached"))
        });

        assert!(matches!(result, Err(EngineError::Io(_))));
        assert_eq!(metrics.cpu_load.get(), 0.0);
        assert_eq!(metrics.memory_load.get(), 0.0);
        assert_eq!(metrics.orders_total.get(), 0);
    }

    #[test]
    fn test_dispatch_publishes_level_when_some_workers_start() {
        let fx = fixture();
        let dispatcher = Dispatcher::new(fx.pipeline.clone(), 10);
        let metrics = fx.registry.troublebox();

        let mut attempt = 0;
        let receipt = dispatcher
            .dispatch_with(Intensity::Normal, |_, job| {
                attempt += 1;
                if attempt == 1 {
                    return Err(io::Error::other("thread limit reached"));
                }
                job();
                Ok(())
            })
            .unwrap();

        assert_eq!(receipt.scheduled, 100);
        assert_eq!(metrics.orders_total.get(), 90);
        assert_eq!(metrics.cpu_load.get(), 1.0);
        assert_eq!(metrics.memory_load.get(), 1.0);
    }

    #[test]
    fn test_failed_write_aborts_only_that_share() {
        let fx = fixture();
        let dispatcher = Dispatcher::new(fx.pipeline.clone(), 10);
        let metrics = fx.registry.troublebox();
        let dir = fx.dir.path().to_path_buf();

        let mut run = 0;
        dispatcher
            .dispatch_with(Intensity::Normal, |_, job| {
                run += 1;
                if run == 6 {
                    std::fs::remove_dir_all(&dir).unwrap();
                }
                job();
                Ok(())
            })
            .unwrap();

        // Five shares of ten completed before the directory vanished; every
        // later share stopped at its first order.
        assert_eq!(metrics.orders_total.get(), 50);
        assert_eq!(metrics.disk_files_written.get(), 50);
    }

    #[test]
    fn test_concurrent_write_failures_keep_counters_in_step() {
        let fx = fixture();
        let dispatcher = Dispatcher::new(fx.pipeline.clone(), 10);
        let metrics = fx.registry.troublebox();

        dispatcher.dispatch(Intensity::Hardcore).unwrap();
        let detached = fx.dir.path().with_extension("detached");
        std::fs::rename(fx.dir.path(), &detached).unwrap();

        // Wait until every worker has stopped moving the counters.
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut last = u64::MAX;
        while Instant::now() < deadline {
            let now = metrics.orders_total.get();
            if now == last {
                break;
            }
            last = now;
            std::thread::sleep(Duration::from_millis(300));
        }

        assert!(metrics.orders_total.get() < 10_000);
        assert_eq!(
            metrics.orders_total.get(),
            metrics.disk_files_written.get()
        );
        std::fs::remove_dir_all(&detached).unwrap();
    }
}
