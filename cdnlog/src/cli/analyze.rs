use crate::cli::output;
use anyhow::{Context, Result};
use cdnlog_core::conf::{AnalysisConfig, load_config};
use cdnlog_core::ingest::load_records_json;
use cdnlog_core::parse::ParseBatch;
use cdnlog_core::report::{ReportFormat, render_json, render_text};
use cdnlog_core::{AnalyzeOptions, analyze_batch, analyze_sources};
use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Log files to read, in order (`.gz` is decompressed)
    #[arg(long, short, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Inputs are JSON records written by `parse`, not raw log lines
    #[arg(long)]
    pub records: bool,

    /// HCL analysis config; built-in defaults otherwise
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Only analyze the trailing N hours (fractions allowed)
    #[arg(long)]
    pub last_hours: Option<f64>,

    /// Add a drill-down section for this exact path
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Report output format (`json` or `text`)
    #[arg(long, default_value_t = ReportFormat::Json)]
    pub format: ReportFormat,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };

    let options = AnalyzeOptions {
        config,
        last_hours: args.last_hours,
        now: None,
        endpoint: args.endpoint,
    };

    let report = if args.records {
        let batch = load_record_files(&args.input)?;
        analyze_batch(&batch, &options)?
    } else {
        analyze_sources(&args.input, &options)?
    };

    let rendered = match args.format {
        ReportFormat::Json => render_json(&report).context("failed to serialize report")?,
        ReportFormat::Text => {
            // Color only when writing straight to a terminal.
            let styled = args.output.is_none() && io::stdout().is_terminal();
            render_text(&report, styled)
        }
    };

    let mut writer = output(args.output.as_deref())?;
    writeln!(writer, "{rendered}")?;
    writer.flush()?;

    Ok(())
}

fn load_record_files(paths: &[PathBuf]) -> Result<ParseBatch> {
    let mut entries = Vec::new();

    for path in paths {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let loaded = load_records_json(BufReader::new(file))
            .with_context(|| format!("failed to load records from {}", path.display()))?;
        entries.extend(loaded);
    }

    Ok(ParseBatch::from_entries(entries))
}
