use crossbeam_channel::Receiver;
use tracing::debug;

use crate::table::AggregationTable;

/// Folds local tables into one global table in arrival order, until every
/// sender is gone and the queue is empty.
pub fn run_reducer(results: Receiver<AggregationTable>) -> AggregationTable {
    let mut global = AggregationTable::new();
    let mut merged = 0usize;
    for local in results {
        global.merge(local);
        merged += 1;
    }
    debug!(tables = merged, keys = global.len(), "reducer finished");
    global
}
