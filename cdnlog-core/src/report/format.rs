use crate::report::AnalyticsReport;
use crate::report::text::render_text;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "text" => Ok(ReportFormat::Text),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Pretty-printed JSON.
pub fn render_json(report: &AnalyticsReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Renders in the requested format. Text output is unstyled.
pub fn render(report: &AnalyticsReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Json => render_json(report),
        ReportFormat::Text => Ok(render_text(report, false)),
    }
}
