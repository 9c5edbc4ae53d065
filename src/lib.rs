//! Per-key min/mean/max over `key;value` measurement files.
//!
//! The file is read in large line-aligned chunks, parsed on a pool of worker
//! threads into private tables, and the tables are merged by a single reducer.
//! Memory stays bounded by the two queues between those stages.

pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod reducer;
pub mod report;
pub mod splitter;
pub mod table;
pub mod worker;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{aggregate_file, aggregate_path, run_pipeline};
pub use table::{Aggregate, AggregationTable};
