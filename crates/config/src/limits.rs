use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_PARALLEL_LIMIT: usize = 10;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Scheduling knobs for the content engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Jobs taken off the queue per batch (one store write per batch).
    pub batch_size: usize,
    /// Jobs in flight at once inside a batch.
    pub parallel_limit: usize,
    /// Quiet period before a queued run starts, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_limit: DEFAULT_PARALLEL_LIMIT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Limits {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(self) -> Result<Self> {
        if self.batch_size == 0 {
            exn::bail!(ErrorKind::InvalidLimit("batch_size"));
        }
        if self.parallel_limit == 0 {
            exn::bail!(ErrorKind::InvalidLimit("parallel_limit"));
        }
        Ok(self)
    }
}
