//! Troublebox Engine
//!
//! Synthetic load generation that reports its own resource consumption as
//! Prometheus metrics, for exercising dashboards, alerting, and autoscaling.
//!
//! ## Components
//!
//! - **Intensity registry**: configured load level per resource and the lock
//!   under which load gauges are arbitrated
//! - **Simulators**: CPU burner, memory allocator, and disk writer
//! - **Dispatcher**: fans batch orders out across a fixed worker pool
//! - **Request-rate window**: tumbling per-second request counter
//! - **Background loops**: host metrics reconciler, disk usage sampler, and
//!   ambient traffic generator

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod host;
pub mod intensity;
pub mod metrics;
pub mod orders;
pub mod rate;
pub mod scheduler;
pub mod simulate;

pub use config::{AmbientConfig, EngineConfig};
pub use dispatcher::{partition, DispatchReceipt, Dispatcher};
pub use engine::{EngineSnapshot, LoadEngine, LoadReceipt};
pub use error::{EngineError, Result};
pub use host::{DiskProbe, DiskSpace, HostSample, HostSampler, SysinfoDiskProbe, SysinfoSampler};
pub use intensity::{Intensity, IntensityRegistry, Resource};
pub use metrics::{MetricsRegistry, TroubleboxMetrics};
pub use rate::RequestRateWindow;
