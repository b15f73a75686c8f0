//! Synthetic CPU, memory, and disk load

pub mod cpu;
pub mod disk;
pub mod memory;

pub use cpu::{burn_once, burn_sustained, SustainedBurn};
pub use disk::DiskWriter;
pub use memory::{allocate_once, allocate_sustained};
