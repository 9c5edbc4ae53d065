use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything that can stop a run. Malformed records are not represented here:
/// the input format is a precondition, not something the pipeline checks.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open `{}`", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read input")]
    Read(#[source] io::Error),

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(&'static str),

    /// Every worker hung up before the reader finished sending.
    #[error("chunk queue closed while the reader was still sending")]
    ChunkQueueClosed,

    #[error("result queue closed while a worker was still sending")]
    ResultQueueClosed,

    #[error("{0} thread panicked")]
    StagePanicked(&'static str),
}
