//! Synthetic disk writer
//!
//! Every write creates one new order file holding the hex SHA-256 digest of
//! 1024 random bytes. Files are never overwritten or removed; pruning the
//! working directory is left to the operator.

use crate::error::Result;
use prometheus::IntCounter;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Random bytes hashed into each order file
pub const ENTROPY_BYTES: usize = 1024;

/// Writes order files into a working directory
#[derive(Debug)]
pub struct DiskWriter {
    dir: PathBuf,
    sequence: AtomicU64,
    files_written: IntCounter,
}

impl DiskWriter {
    /// Create a writer, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>, files_written: IntCounter) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            sequence: AtomicU64::new(0),
            files_written,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one order file labelled with `mode` and count it. The counter is
    /// only incremented once the content is fully written.
    pub fn write_order(&self, mode: &str) -> Result<PathBuf> {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(order_file_name(mode, millis, seq));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(order_content().as_bytes())?;

        self.files_written.inc();
        Ok(path)
    }
}

/// File name of an order written at `millis` with sequence number `seq`
pub fn order_file_name(mode: &str, millis: i64, seq: u64) -> String {
    format!("order_{mode}_{millis}_{seq}.txt")
}

/// Hex SHA-256 digest of fresh random bytes
pub fn order_content() -> String {
    let mut entropy = [0u8; ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut entropy);
    hex::encode(Sha256::digest(entropy))
}
