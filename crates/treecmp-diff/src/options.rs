use serde::{Deserialize, Serialize};

use crate::error::{CompareError, CompareResult};

/// Chunk size used for content comparison unless configured otherwise.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Tunables for a comparison run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Parallel content comparisons. `0` and `1` both mean sequential.
    pub workers: usize,
    /// Bytes read from each file per chunk during content comparison.
    pub buffer_size: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl CompareOptions {
    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the content comparison chunk size.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Returns `true` when comparisons run on a worker pool.
    pub fn is_parallel(&self) -> bool {
        self.workers > 1
    }

    pub fn validate(&self) -> CompareResult<()> {
        if self.buffer_size == 0 {
            return Err(CompareError::InvalidOptions(
                "buffer_size must be at least 1 byte".into(),
            ));
        }
        Ok(())
    }
}
