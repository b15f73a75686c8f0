//! Real host measurements backed by `sysinfo`

use crate::error::{EngineError, Result};
use std::path::Path;
use sysinfo::{Disks, System};

/// One sample of host utilization, in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Source of host CPU and memory utilization
pub trait HostSampler: Send {
    fn sample(&mut self) -> HostSample;
}

/// Samples the local host. CPU usage is measured over the time elapsed since
/// the previous call, so the sampler must be kept alive between ticks.
pub struct SysinfoSampler {
    system: System,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSampler for SysinfoSampler {
    fn sample(&mut self) -> HostSample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let total_memory = self.system.total_memory();
        let memory_percent = if total_memory > 0 {
            (self.system.used_memory() as f64 / total_memory as f64) * 100.0
        } else {
            0.0
        };

        HostSample {
            cpu_percent: f64::from(self.system.global_cpu_usage()),
            memory_percent,
        }
    }
}

/// Capacity of the filesystem holding a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpace {
    pub total: u64,
    pub available: u64,
}

impl DiskSpace {
    /// `used / total × 100`, or `None` for a zero-sized filesystem. `used`
    /// is `total - available`, so blocks reserved for root count as used.
    pub fn used_percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let used = self.total.saturating_sub(self.available);
        Some(used as f64 / self.total as f64 * 100.0)
    }
}

/// Source of filesystem capacity for a path
pub trait DiskProbe: Send {
    fn space(&mut self, path: &Path) -> Result<DiskSpace>;
}

/// Resolves a path to the mounted disk with the longest matching mount point
#[derive(Debug, Default)]
pub struct SysinfoDiskProbe;

impl DiskProbe for SysinfoDiskProbe {
    fn space(&mut self, path: &Path) -> Result<DiskSpace> {
        let path = path.canonicalize()?;
        let disks = Disks::new_with_refreshed_list();
        let mounts = disks
            .list()
            .iter()
            .map(|d| (d.mount_point(), d.total_space(), d.available_space()));

        select_mount(&path, mounts).ok_or_else(|| {
            EngineError::DiskQuery(format!("no mounted disk holds {}", path.display()))
        })
    }
}

/// Pick the entry whose mount point is the longest prefix of `path`
pub fn select_mount<'a, I>(path: &Path, mounts: I) -> Option<DiskSpace>
where
    I: IntoIterator<Item = (&'a Path, u64, u64)>,
{
    mounts
        .into_iter()
        .filter(|(mount, _, _)| path.starts_with(mount))
        .max_by_key(|(mount, _, _)| mount.components().count())
        .map(|(_, total, available)| DiskSpace { total, available })
}
