use crate::analytics::{
    DailySummary, EndpointDrillDown, ErrorAnalysis, PerformanceMetrics, QueryPatterns, Section,
    SlownessInvestigation, TrafficPatterns, UserAgentAnalysis,
};
use crate::model::ParseFailureReason;
use crate::parse::ParseStats;
use crate::window::WindowBounds;
use serde::Serialize;
use std::collections::BTreeMap;

/// The complete analytics output. Field order is the JSON key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub metadata: ReportMetadata,
    pub traffic_patterns: TrafficPatterns,
    pub error_analysis: ErrorAnalysis,
    pub performance_metrics: PerformanceMetrics,
    pub user_agent_analysis: UserAgentAnalysis,
    pub query_patterns: QueryPatterns,
    pub slowness_investigation: SlownessInvestigation,
    /// `null` unless a target endpoint was requested
    pub endpoint_drill_down: Option<EndpointDrillDown>,
    pub daily_summary: DailySummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub total_lines: usize,
    pub blank_lines: usize,
    pub parsed_entries: usize,
    pub parse_failures: usize,
    pub failures_by_reason: BTreeMap<ParseFailureReason, usize>,
    pub invalid_timestamps: usize,
    pub invalid_query_strings: usize,
    pub analyzed_entries: usize,
    pub window: Option<WindowBounds>,
    /// Nothing survived parsing and filtering; every section is empty
    pub no_data: bool,
}

impl ReportMetadata {
    pub fn new(stats: &ParseStats, analyzed_entries: usize, window: Option<WindowBounds>) -> Self {
        Self {
            total_lines: stats.total_lines,
            blank_lines: stats.blank_lines,
            parsed_entries: stats.parsed,
            parse_failures: stats.failed,
            failures_by_reason: stats.failures_by_reason.clone(),
            invalid_timestamps: stats.invalid_timestamps,
            invalid_query_strings: stats.invalid_query_strings,
            analyzed_entries,
            window,
            no_data: analyzed_entries == 0,
        }
    }
}

/// Places each section under its key. Sections not supplied stay empty.
pub fn assemble(sections: Vec<Section>, metadata: ReportMetadata) -> AnalyticsReport {
    let mut report = AnalyticsReport {
        metadata,
        ..AnalyticsReport::default()
    };

    for section in sections {
        match section {
            Section::TrafficPatterns(s) => report.traffic_patterns = s,
            Section::ErrorAnalysis(s) => report.error_analysis = s,
            Section::PerformanceMetrics(s) => report.performance_metrics = s,
            Section::UserAgentAnalysis(s) => report.user_agent_analysis = s,
            Section::QueryPatterns(s) => report.query_patterns = s,
            Section::SlownessInvestigation(s) => report.slowness_investigation = s,
            Section::EndpointDrillDown(s) => report.endpoint_drill_down = Some(*s),
            Section::DailySummary(s) => report.daily_summary = s,
        }
    }

    report
}
