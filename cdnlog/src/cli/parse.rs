use crate::cli::output;
use anyhow::Result;
use cdnlog_core::ingest::{read_sources, write_records_csv, write_records_json};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum RecordFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Log files to read, in order (`.gz` is decompressed)
    #[arg(long, short, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Record output format
    #[arg(long, value_enum, default_value_t = RecordFormat::Json)]
    pub format: RecordFormat,

    /// Write records here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: ParseArgs) -> Result<()> {
    let batch = read_sources(&args.input)?;
    let stats = batch.stats();

    info!(
        lines = stats.total_lines,
        parsed = stats.parsed,
        failed = stats.failed,
        invalid_timestamps = stats.invalid_timestamps,
        invalid_query_strings = stats.invalid_query_strings,
        "parse complete"
    );

    let writer = output(args.output.as_deref())?;
    match args.format {
        RecordFormat::Json => write_records_json(batch.entries(), writer)?,
        RecordFormat::Csv => write_records_csv(batch.entries(), writer)?,
    }

    Ok(())
}
