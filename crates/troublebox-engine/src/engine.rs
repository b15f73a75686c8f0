//! Load engine
//!
//! `LoadEngine` owns the process-wide metrics and load state and exposes the
//! triggers that start synthetic load. Every trigger returns as soon as its
//! workers are started; progress is only observable through the metrics.
//! Workers are detached threads, so dropping the engine or shutting the
//! process down does not wait for them.

use crate::config::EngineConfig;
use crate::dispatcher::{DispatchReceipt, Dispatcher};
use crate::error::Result;
use crate::host::{DiskProbe, HostSampler, SysinfoDiskProbe, SysinfoSampler};
use crate::intensity::{Intensity, IntensityRegistry, Resource};
use crate::metrics::{MetricsRegistry, TroubleboxMetrics};
use crate::orders::OrderPipeline;
use crate::rate::RequestRateWindow;
use crate::scheduler::{self, AmbientTraffic, DiskUsageSampler, HostMetricsReconciler};
use crate::simulate::{cpu, memory, DiskWriter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

/// What a sustained load trigger started
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LoadReceipt {
    pub mode: Intensity,
    pub intensity: u32,
}

/// Point-in-time view of the engine state
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub cpu_intensity: f64,
    pub memory_intensity: f64,
    pub active_cpu_tests: usize,
    pub active_memory_tests: usize,
    pub cpu_load: f64,
    pub memory_load: f64,
    pub orders_total: u64,
    pub disk_files_written: u64,
    pub disk_usage_percent: f64,
    pub requests_per_second: f64,
    pub pending_requests: u64,
    pub work_dir: PathBuf,
}

/// Shared load-simulation state and triggers
#[derive(Clone)]
pub struct LoadEngine {
    config: Arc<EngineConfig>,
    registry: Arc<MetricsRegistry>,
    intensity: Arc<IntensityRegistry>,
    rate: Arc<RequestRateWindow>,
    writer: Arc<DiskWriter>,
    pipeline: Arc<OrderPipeline>,
    dispatcher: Arc<Dispatcher>,
}

impl LoadEngine {
    /// Build the engine, registering its metrics and creating the working
    /// directory
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(MetricsRegistry::with_prefix(&config.metrics_prefix)?);
        let metrics = registry.troublebox().clone();
        let intensity = Arc::new(IntensityRegistry::new());
        let rate = Arc::new(RequestRateWindow::new(
            metrics.orders_total.clone(),
            metrics.requests_per_second.clone(),
        ));
        let writer = Arc::new(DiskWriter::new(
            &config.work_dir,
            metrics.disk_files_written.clone(),
        )?);
        let pipeline = Arc::new(OrderPipeline::new(
            metrics,
            intensity.clone(),
            rate.clone(),
            writer.clone(),
            config.churn_hold(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(pipeline.clone(), config.dispatch_workers));

        Ok(Self {
            config: Arc::new(config),
            registry,
            intensity,
            rate,
            writer,
            pipeline,
            dispatcher,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &TroubleboxMetrics {
        self.registry.troublebox()
    }

    pub fn intensity(&self) -> &IntensityRegistry {
        &self.intensity
    }

    pub fn rate_window(&self) -> &RequestRateWindow {
        &self.rate
    }

    pub fn work_dir(&self) -> &Path {
        self.writer.dir()
    }

    /// Render all metrics in the Prometheus text format
    pub fn export_metrics(&self) -> Result<String> {
        self.registry.export()
    }

    /// Schedule `mode.order_count()` orders across the dispatcher pool
    pub fn dispatch(&self, mode: Intensity) -> Result<DispatchReceipt> {
        self.dispatcher.dispatch(mode)
    }

    /// Start a sustained CPU test at `mode`
    pub fn set_cpu_load(&self, mode: Intensity) -> Result<LoadReceipt> {
        let gauge = self.metrics().cpu_load.clone();
        self.intensity.begin_sustained(Resource::Cpu, mode, &gauge);

        let intensity = self.intensity.clone();
        let finish_gauge = gauge.clone();
        let started = cpu::burn_sustained(mode, self.config.sustained_duration(), move || {
            intensity.finish_sustained(Resource::Cpu, &finish_gauge);
        });
        if let Err(e) = started {
            self.intensity.finish_sustained(Resource::Cpu, &gauge);
            return Err(e.into());
        }

        Ok(LoadReceipt {
            mode,
            intensity: mode.multiplier(),
        })
    }

    /// Start a sustained memory test at `mode`
    pub fn set_memory_load(&self, mode: Intensity) -> Result<LoadReceipt> {
        let gauge = self.metrics().memory_load.clone();
        self.intensity.begin_sustained(Resource::Memory, mode, &gauge);

        let intensity = self.intensity.clone();
        let finish_gauge = gauge.clone();
        let started = memory::allocate_sustained(
            mode,
            self.config.sustained_duration(),
            self.intensity.clone(),
            gauge.clone(),
            self.config.churn_hold(),
            move || {
                intensity.finish_sustained(Resource::Memory, &finish_gauge);
            },
        );
        if let Err(e) = started {
            self.intensity.finish_sustained(Resource::Memory, &gauge);
            return Err(e.into());
        }

        Ok(LoadReceipt {
            mode,
            intensity: mode.multiplier(),
        })
    }

    /// Write one order file labelled `mode` on a detached worker
    pub fn set_disk_load(&self, mode: Intensity) -> Result<Intensity> {
        let pipeline = self.pipeline.clone();
        thread::Builder::new()
            .name("disk-load".to_string())
            .spawn(move || match pipeline.write(mode) {
                Ok(path) => {
                    tracing::debug!(mode = %mode, path = %path.display(), "Disk load written")
                }
                Err(e) => tracing::error!(mode = %mode, error = %e, "Disk load write failed"),
            })?;
        Ok(mode)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let metrics = self.metrics();
        EngineSnapshot {
            cpu_intensity: self.intensity.get(Resource::Cpu),
            memory_intensity: self.intensity.get(Resource::Memory),
            active_cpu_tests: self.intensity.active_sustained(Resource::Cpu),
            active_memory_tests: self.intensity.active_sustained(Resource::Memory),
            cpu_load: metrics.cpu_load.get(),
            memory_load: metrics.memory_load.get(),
            orders_total: metrics.orders_total.get(),
            disk_files_written: metrics.disk_files_written.get(),
            disk_usage_percent: metrics.disk_usage_percent.get(),
            requests_per_second: metrics.requests_per_second.get(),
            pending_requests: self.rate.pending(),
            work_dir: self.work_dir().to_path_buf(),
        }
    }

    /// Start the background loops against the local host. Must be called
    /// from within a tokio runtime.
    pub fn spawn_background_loops(&self) {
        self.spawn_background_loops_with(
            Box::new(SysinfoSampler::new()),
            Box::new(SysinfoDiskProbe),
        );
    }

    /// Start the request-rate flusher, host reconciler, disk usage sampler,
    /// and (when enabled) ambient traffic as detached tasks
    pub fn spawn_background_loops_with(
        &self,
        sampler: Box<dyn HostSampler>,
        probe: Box<dyn DiskProbe>,
    ) {
        let metrics = self.metrics();

        tokio::spawn(scheduler::run_rate_window(
            self.rate.clone(),
            self.config.rate_window(),
        ));

        let reconciler = HostMetricsReconciler::new(
            sampler,
            self.intensity.clone(),
            metrics.cpu_load.clone(),
            metrics.memory_load.clone(),
            self.config.arbitration_threshold,
        );
        tokio::spawn(reconciler.run(self.config.reconcile_interval()));

        let disk_sampler = DiskUsageSampler::new(
            probe,
            self.work_dir().to_path_buf(),
            metrics.disk_usage_percent.clone(),
        );
        tokio::spawn(disk_sampler.run(self.config.disk_sample_interval()));

        if self.config.ambient.enabled {
            let ambient = AmbientTraffic::new(self.pipeline.clone(), self.config.ambient.clone());
            tokio::spawn(ambient.run());
        }

        tracing::info!(
            ambient = self.config.ambient.enabled,
            work_dir = %self.work_dir().display(),
            "Background loops started"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn engine(dir: &Path, sustained_ms: u64) -> LoadEngine {
        LoadEngine::new(EngineConfig {
            work_dir: dir.join("orders"),
            sustained_duration_ms: sustained_ms,
            churn_hold_ms: 0,
            ..Default::default()
        })
        .unwrap()
    }

    fn wait_for(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !done() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        true
    }

    #[test]
    fn test_new_creates_work_dir_and_rejects_bad_config() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), 1_000);
        assert!(engine.work_dir().is_dir());

        let bad = LoadEngine::new(EngineConfig {
            work_dir: tmp.path().join("other"),
            dispatch_workers: 0,
            ..Default::default()
        });
        assert!(bad.is_err());
        assert!(!tmp.path().join("other").exists());
    }

    #[test]
    fn test_cpu_load_publishes_then_decays() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), 100);

        let receipt = engine.set_cpu_load(Intensity::Hardcore).unwrap();
        assert_eq!(receipt.intensity, 5);
        assert_eq!(engine.metrics().cpu_load.get(), 50.0);
        assert_eq!(engine.intensity().get(Resource::Cpu), 5.0);
        assert_eq!(engine.intensity().active_sustained(Resource::Cpu), 1);

        assert!(wait_for(|| engine.intensity().active_sustained(Resource::Cpu) == 0));
        assert_eq!(engine.metrics().cpu_load.get(), 0.0);
    }

    #[test]
    fn test_memory_load_publishes_then_decays() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), 100);

        engine.set_memory_load(Intensity::Normal).unwrap();
        assert_eq!(engine.metrics().memory_load.get(), 10.0);

        assert!(wait_for(|| engine.intensity().active_sustained(Resource::Memory) == 0));
        assert_eq!(engine.metrics().memory_load.get(), 0.0);
    }

    #[test]
    fn test_disk_load_writes_one_file_without_counting_an_order() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), 100);

        engine.set_disk_load(Intensity::Nightmare).unwrap();
        assert!(wait_for(|| engine.metrics().disk_files_written.get() == 1));
        assert_eq!(engine.metrics().orders_total.get(), 0);

        let name = std::fs::read_dir(engine.work_dir())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .file_name();
        assert!(name.to_string_lossy().starts_with("order_nightmare_"));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), 100);
        engine.rate_window().record();
        engine.metrics().disk_usage_percent.set(12.5);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.orders_total, 1);
        assert_eq!(snapshot.pending_requests, 1);
        assert_eq!(snapshot.disk_usage_percent, 12.5);
        assert_eq!(snapshot.active_cpu_tests, 0);
        assert!(engine.export_metrics().unwrap().contains("troublebox_orders_total 1"));
    }
}
