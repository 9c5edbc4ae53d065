use std::thread;

use crate::PipelineError;

/// Tunables for [`run_pipeline`](crate::run_pipeline).
///
/// Peak memory held in flight is roughly
/// `(chunk_queue_depth + workers) * chunk_size`, plus one local table per
/// queued or in-progress result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bytes requested from the source per read.
    pub chunk_size: usize,
    /// Number of worker threads parsing chunks.
    pub workers: usize,
    /// Chunks buffered between the reader and the workers.
    pub chunk_queue_depth: usize,
    /// Local tables buffered between the workers and the reducer.
    pub result_queue_depth: usize,
}

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024 * 1024;
pub const DEFAULT_CHUNK_QUEUE_DEPTH: usize = 15;
pub const DEFAULT_RESULT_QUEUE_DEPTH: usize = 10;

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: default_workers(),
            chunk_queue_depth: DEFAULT_CHUNK_QUEUE_DEPTH,
            result_queue_depth: DEFAULT_RESULT_QUEUE_DEPTH,
        }
    }
}

impl PipelineConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_chunk_queue_depth(mut self, depth: usize) -> Self {
        self.chunk_queue_depth = depth;
        self
    }

    pub fn with_result_queue_depth(mut self, depth: usize) -> Self {
        self.result_queue_depth = depth;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_size == 0 {
            return Err(PipelineError::InvalidConfig("chunk_size must be at least 1"));
        }
        if self.workers == 0 {
            return Err(PipelineError::InvalidConfig("workers must be at least 1"));
        }
        if self.chunk_queue_depth == 0 {
            return Err(PipelineError::InvalidConfig(
                "chunk_queue_depth must be at least 1",
            ));
        }
        if self.result_queue_depth == 0 {
            return Err(PipelineError::InvalidConfig(
                "result_queue_depth must be at least 1",
            ));
        }
        Ok(())
    }
}

/// One core is left for the reader and reducer.
pub fn default_workers() -> usize {
    match thread::available_parallelism() {
        Ok(n) => n.get().saturating_sub(1).max(1),
        Err(e) => {
            tracing::warn!(error = %e, "couldn't query the available parallelism, using one worker");
            1
        }
    }
}
