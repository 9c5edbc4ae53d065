use std::{fs::File, io::Read, path::Path, thread, time::Instant};

use crossbeam_channel::bounded;
use tracing::info;

use crate::{
    config::PipelineConfig,
    reducer::run_reducer,
    report,
    splitter::split_chunks,
    table::AggregationTable,
    worker::run_worker,
    PipelineError,
};

/// Runs the reader, `config.workers` workers and the reducer over `source`
/// and returns the global table.
///
/// Stages only talk through two bounded queues. The reader closes the chunk
/// queue at EOF; the result queue is closed once every worker has been
/// joined, which ends the reducer.
pub fn run_pipeline<R: Read + Send>(
    source: R,
    config: &PipelineConfig,
) -> Result<AggregationTable, PipelineError> {
    config.validate()?;

    let (chunk_tx, chunk_rx) = bounded(config.chunk_queue_depth);
    let (result_tx, result_rx) = bounded(config.result_queue_depth);
    let chunk_size = config.chunk_size;

    thread::scope(|s| {
        let reader = s.spawn(move || split_chunks(source, chunk_size, chunk_tx));

        let workers: Vec<_> = (0..config.workers)
            .map(|id| {
                let chunks = chunk_rx.clone();
                let results = result_tx.clone();
                s.spawn(move || run_worker(id, chunks, results))
            })
            .collect();
        // only the workers may hold the receiving end, else a dead pool
        // would leave the reader blocked on a full queue
        drop(chunk_rx);

        let reducer = s.spawn(move || run_reducer(result_rx));

        let mut worker_error = None;
        for worker in workers {
            match worker.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    worker_error.get_or_insert(e);
                }
                Err(_) => {
                    worker_error.get_or_insert(PipelineError::StagePanicked("worker"));
                }
            }
        }
        // all workers are done, close the result queue
        drop(result_tx);

        let global = reducer
            .join()
            .map_err(|_| PipelineError::StagePanicked("reducer"))?;
        let split = reader
            .join()
            .map_err(|_| PipelineError::StagePanicked("reader"))?;

        let split = match (split, worker_error) {
            // the pool died first and the reader only saw the queue close
            (Err(PipelineError::ChunkQueueClosed), Some(e)) => return Err(e),
            (Err(e), _) | (Ok(_), Some(e)) => return Err(e),
            (Ok(split), None) => split,
        };
        info!(
            chunks = split.chunks,
            bytes = split.bytes_sent,
            keys = global.len(),
            "pipeline finished"
        );
        Ok(global)
    })
}

/// Opens `path` and runs the pipeline over it.
pub fn aggregate_path(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<AggregationTable, PipelineError> {
    let path = path.as_ref();
    let started = Instant::now();
    info!(path = %path.display(), workers = config.workers, "reading file");

    let file = File::open(path).map_err(|source| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let global = run_pipeline(file, config)?;

    info!(elapsed = ?started.elapsed(), "done");
    Ok(global)
}

/// Aggregates the file at `path` and renders the report.
pub fn aggregate_file(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    aggregate_path(path, config).map(report::render)
}
