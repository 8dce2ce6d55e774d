use crate::analytics::{default_aggregators, run_aggregators};
use crate::conf::{AnalysisConfig, ConfigError};
use crate::ingest::{IngestError, read_sources};
use crate::parse::ParseBatch;
use crate::report::{AnalyticsReport, ReportMetadata, assemble};
use crate::window::{WindowView, filter_window};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Everything an analysis run needs besides the records themselves.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub config: AnalysisConfig,
    /// Trailing window in hours; `None` analyzes everything
    pub last_hours: Option<f64>,
    /// Window anchor; defaults to the current UTC time
    pub now: Option<DateTime<Utc>>,
    /// Exact path for the drill-down section
    pub endpoint: Option<String>,
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Reads, parses and analyzes the given files.
pub fn analyze_sources(
    paths: &[PathBuf],
    options: &AnalyzeOptions,
) -> Result<AnalyticsReport, AnalyzeError> {
    // Fail on bad configuration before touching any file.
    options.config.validate()?;

    let batch = read_sources(paths)?;
    analyze_batch(&batch, options)
}

/// Analyzes an already parsed batch.
///
/// Configuration and window hours are validated before any aggregation. An
/// empty batch is not an error: the report is flagged `no_data`.
pub fn analyze_batch(
    batch: &ParseBatch,
    options: &AnalyzeOptions,
) -> Result<AnalyticsReport, AnalyzeError> {
    let config = &options.config;
    config.validate()?;

    let view = match options.last_hours {
        Some(hours) => {
            let now = options.now.unwrap_or_else(Utc::now);
            filter_window(batch.entries(), now, hours)?
        }
        None => WindowView::all(batch.entries()),
    };

    let stats = batch.stats();
    info!(
        parsed = stats.parsed,
        failed = stats.failed,
        analyzed = view.len(),
        "analyzing log entries"
    );

    if view.is_empty() {
        warn!("no log entries to analyze");
    }

    let aggregators = default_aggregators(options.endpoint.as_deref());
    let sections = run_aggregators(&aggregators, &view.entries, config);

    let metadata = ReportMetadata::new(stats, view.len(), view.bounds);
    Ok(assemble(sections, metadata))
}
