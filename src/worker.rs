use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::{
    parse::{parse_scaled, MAX_VALUE_LEN},
    splitter::Chunk,
    table::AggregationTable,
    PipelineError,
};

const DELIMITER: u8 = b';';

/// Aggregates every record in `chunk` into a fresh table.
///
/// Assumes `chunk` begins at the start of a record and ends right after a
/// `\n`. Each value must be followed by a newline within
/// [`MAX_VALUE_LEN`] bytes of its delimiter.
pub fn aggregate_chunk(chunk: &[u8]) -> AggregationTable {
    let mut table = AggregationTable::new();
    let mut record_start = 0;
    let mut i = 0;

    while i < chunk.len() {
        if chunk[i] != DELIMITER {
            i += 1;
            continue;
        }

        let key = &chunk[record_start..i];
        let value_start = i + 1;
        let value_len = chunk[value_start..]
            .iter()
            .take(MAX_VALUE_LEN + 1)
            .position(|b| *b == b'\n')
            .unwrap_or_else(|| (chunk.len() - value_start).min(MAX_VALUE_LEN));
        table.record(key, parse_scaled(&chunk[value_start..value_start + value_len]));

        // skip the value and its newline
        i = value_start + value_len + 1;
        record_start = i;
    }

    table
}

/// Pulls chunks until the queue is closed and drained, sending one local
/// table per chunk.
pub fn run_worker(
    id: usize,
    chunks: Receiver<Chunk>,
    results: Sender<AggregationTable>,
) -> Result<usize, PipelineError> {
    let mut processed = 0;
    for chunk in chunks {
        let table = aggregate_chunk(chunk.as_bytes());
        drop(chunk);
        results
            .send(table)
            .map_err(|_| PipelineError::ResultQueueClosed)?;
        processed += 1;
    }
    debug!(worker = id, chunks = processed, "worker finished");
    Ok(processed)
}
