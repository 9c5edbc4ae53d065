use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use brc_pipeline::{config, pipeline, report, PipelineConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Per-station min/mean/max over a `station;temperature` measurements file.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Measurements file, one `key;value` record per line.
    #[arg(default_value = "measurements.txt")]
    path: PathBuf,

    /// Bytes read per chunk.
    #[arg(long, default_value_t = config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Worker threads [default: available parallelism minus one]
    #[arg(long)]
    workers: Option<usize>,

    /// Chunks buffered ahead of the workers.
    #[arg(long, default_value_t = config::DEFAULT_CHUNK_QUEUE_DEPTH)]
    chunk_queue_depth: usize,

    /// Local tables buffered ahead of the reducer.
    #[arg(long, default_value_t = config::DEFAULT_RESULT_QUEUE_DEPTH)]
    result_queue_depth: usize,

    /// Wrap the report in `{}`.
    #[arg(long)]
    braces: bool,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_chunk_queue_depth(self.chunk_queue_depth)
            .with_result_queue_depth(self.result_queue_depth);
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.pipeline_config();

    let table = pipeline::aggregate_path(&args.path, &config)
        .with_context(|| format!("aggregating {}", args.path.display()))?;
    let output = if args.braces {
        report::render_braced(table)
    } else {
        report::render(table)
    };

    let mut out = BufWriter::with_capacity(2 * 1024 * 1024, std::io::stdout().lock());
    writeln!(out, "{output}")?;
    out.flush()?;
    Ok(())
}
