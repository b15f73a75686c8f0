//! Severity levels and the intensity registry
//!
//! The registry holds the configured load multiplier per resource and is the
//! lock under which synthetic workers and the host reconciler publish the CPU
//! and memory gauges.

use crate::error::EngineError;
use parking_lot::Mutex;
use prometheus::Gauge;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier stored before any load test has run
pub const BASELINE_INTENSITY: f64 = 0.0005;

/// Load severity selectable by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Normal,
    Hardcore,
    Nightmare,
}

impl Intensity {
    /// All levels, lowest first
    pub const ALL: [Intensity; 3] = [Intensity::Normal, Intensity::Hardcore, Intensity::Nightmare];

    /// Load multiplier for this level
    pub fn multiplier(self) -> u32 {
        match self {
            Intensity::Normal => 1,
            Intensity::Hardcore => 5,
            Intensity::Nightmare => 10,
        }
    }

    /// Number of orders a batch dispatch schedules at this level
    pub fn order_count(self) -> u64 {
        match self {
            Intensity::Normal => 100,
            Intensity::Hardcore => 10_000,
            Intensity::Nightmare => 1_000_000,
        }
    }

    /// Gauge value published while a sustained test at this level runs
    pub fn sustained_gauge(self) -> f64 {
        f64::from(self.multiplier() * 10)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Normal => "normal",
            Intensity::Hardcore => "hardcore",
            Intensity::Nightmare => "nightmare",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Intensity::Normal),
            "hardcore" => Ok(Intensity::Hardcore),
            "nightmare" => Ok(Intensity::Nightmare),
            other => Err(EngineError::InvalidLevel(other.to_string())),
        }
    }
}

/// Resource whose load level is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Cpu,
    Memory,
}

#[derive(Debug)]
struct ResourceState {
    level: f64,
    active_sustained: usize,
}

impl Default for ResourceState {
    fn default() -> Self {
        Self {
            level: BASELINE_INTENSITY,
            active_sustained: 0,
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    cpu: ResourceState,
    memory: ResourceState,
}

impl RegistryState {
    fn resource(&mut self, resource: Resource) -> &mut ResourceState {
        match resource {
            Resource::Cpu => &mut self.cpu,
            Resource::Memory => &mut self.memory,
        }
    }
}

/// Current load level per resource, guarded by a single lock
#[derive(Debug, Default)]
pub struct IntensityRegistry {
    state: Mutex<RegistryState>,
}

impl IntensityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the multiplier for a resource. Last writer wins.
    pub fn set(&self, resource: Resource, level: Intensity) {
        self.state.lock().resource(resource).level = f64::from(level.multiplier());
    }

    /// Read the multiplier for a resource
    pub fn get(&self, resource: Resource) -> f64 {
        self.state.lock().resource(resource).level
    }

    /// Number of sustained tests currently running for a resource
    pub fn active_sustained(&self, resource: Resource) -> usize {
        self.state.lock().resource(resource).active_sustained
    }

    /// Publish a synthetic value on a gauge
    pub fn publish(&self, gauge: &Gauge, value: f64) {
        let _guard = self.state.lock();
        gauge.set(value);
    }

    /// Overwrite `gauge` with a real host sample unless a synthetic value at
    /// or above `threshold` currently holds it. Returns whether it was
    /// overwritten.
    pub fn arbitrate(&self, gauge: &Gauge, threshold: f64, sample: f64) -> bool {
        let _guard = self.state.lock();
        if gauge.get() < threshold {
            gauge.set(sample);
            true
        } else {
            false
        }
    }

    /// Record the start of a sustained test and publish its gauge value
    pub fn begin_sustained(&self, resource: Resource, level: Intensity, gauge: &Gauge) {
        let mut state = self.state.lock();
        let entry = state.resource(resource);
        entry.level = f64::from(level.multiplier());
        entry.active_sustained += 1;
        gauge.set(level.sustained_gauge());
    }

    /// Record the end of a sustained test. When it was the last one running
    /// for the resource the gauge decays to zero so host sampling takes over
    /// on the next reconciler tick. Returns whether the gauge decayed.
    pub fn finish_sustained(&self, resource: Resource, gauge: &Gauge) -> bool {
        let mut state = self.state.lock();
        let entry = state.resource(resource);
        entry.active_sustained = entry.active_sustained.saturating_sub(1);
        if entry.active_sustained == 0 {
            gauge.set(0.0);
            true
        } else {
            false
        }
    }
}
