//! Synthetic CPU burner

use crate::intensity::Intensity;
use std::hint::black_box;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Pause between compute blocks in sustained workers
pub const WORKER_YIELD: Duration = Duration::from_millis(1);

/// Extra time a sustained burn waits for its workers past the deadline
pub const JOIN_GRACE: Duration = Duration::from_secs(1);

fn compute_block() -> u64 {
    (0..10_000u64).fold(0u64, |acc, i| acc.wrapping_add(black_box(i) * i))
}

/// Spin on numeric work until `duration` has elapsed. Returns the number of
/// compute blocks executed.
pub fn burn_once(duration: Duration) -> u64 {
    let deadline = Instant::now() + duration;
    let mut blocks = 0u64;
    loop {
        black_box(compute_block());
        blocks += 1;
        if Instant::now() >= deadline {
            return blocks;
        }
    }
}

fn sustained_worker(deadline: Instant) {
    while Instant::now() < deadline {
        black_box(compute_block());
        thread::sleep(WORKER_YIELD);
    }
}

/// Handle describing a started sustained burn
#[derive(Debug, Clone, Copy)]
pub struct SustainedBurn {
    /// Worker threads started
    pub workers: usize,
    /// Shared deadline of all workers
    pub deadline: Instant,
}

/// Number of workers a sustained burn uses at `level`
pub fn sustained_workers(level: Intensity) -> usize {
    level.multiplier() as usize * 2
}

/// Start `2 × multiplier` burner threads until `now + duration`, and a
/// detached supervisor that waits for them up to the deadline plus
/// [`JOIN_GRACE`] before calling `on_finish`. Workers still running at that
/// point are abandoned, not killed.
pub fn burn_sustained<F>(
    level: Intensity,
    duration: Duration,
    on_finish: F,
) -> std::io::Result<SustainedBurn>
where
    F: FnOnce() + Send + 'static,
{
    let workers = sustained_workers(level);
    let deadline = Instant::now() + duration;
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let mut started = 0;
    for index in 0..workers {
        let done_tx = done_tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("cpu-burn-{index}"))
            .spawn(move || {
                sustained_worker(deadline);
                let _ = done_tx.send(());
            });
        match spawned {
            Ok(_) => started += 1,
            Err(e) if started == 0 => return Err(e),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    started,
                    requested = workers,
                    "Could not start every CPU burner"
                );
                break;
            }
        }
    }
    drop(done_tx);

    thread::Builder::new()
        .name("cpu-burn-supervisor".to_string())
        .spawn(move || {
            let give_up = deadline + JOIN_GRACE;
            let mut finished = 0;
            while finished < started {
                let remaining = give_up.saturating_duration_since(Instant::now());
                match done_rx.recv_timeout(remaining) {
                    Ok(()) => finished += 1,
                    Err(_) => break,
                }
            }
            if finished < started {
                tracing::warn!(
                    abandoned = started - finished,
                    "CPU burners overran their deadline"
                );
            }
            tracing::info!(level = %level, workers = started, "Sustained CPU load finished");
            on_finish();
        })?;

    tracing::info!(
        level = %level,
        workers = started,
        duration_ms = duration.as_millis() as u64,
        "Sustained CPU load started"
    );

    Ok(SustainedBurn {
        workers: started,
        deadline,
    })
}
