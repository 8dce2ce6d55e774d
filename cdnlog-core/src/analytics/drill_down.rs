use crate::analytics::daily::{DailySummary, daily_summary};
use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::errors::{ErrorAnalysis, error_analysis};
use crate::analytics::performance::{PerformanceMetrics, performance_metrics};
use crate::analytics::query_patterns::{QueryPatterns, query_patterns};
use crate::analytics::slowness::{SlownessInvestigation, slowness_investigation};
use crate::analytics::traffic::{TrafficPatterns, traffic_patterns};
use crate::analytics::user_agents::{UserAgentAnalysis, user_agent_analysis};
use crate::conf::AnalysisConfig;
use crate::model::LogEntry;
use serde::Serialize;

/// Every other section, recomputed over the requests for a single path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointDrillDown {
    pub endpoint: String,
    pub found: bool,
    pub total_requests: u64,
    pub traffic_patterns: TrafficPatterns,
    pub error_analysis: ErrorAnalysis,
    pub performance_metrics: PerformanceMetrics,
    pub user_agent_analysis: UserAgentAnalysis,
    pub query_patterns: QueryPatterns,
    pub slowness_investigation: SlownessInvestigation,
    pub daily_summary: DailySummary,
}

pub struct DrillDownAggregator {
    target: String,
}

impl DrillDownAggregator {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Aggregator for DrillDownAggregator {
    fn name(&self) -> SectionName {
        SectionName::EndpointDrillDown
    }

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section {
        Section::EndpointDrillDown(Box::new(drill_down(records, &self.target, config)))
    }

    fn empty(&self) -> Section {
        Section::EndpointDrillDown(Box::new(EndpointDrillDown {
            endpoint: self.target.clone(),
            ..EndpointDrillDown::default()
        }))
    }
}

/// Exact path match; query strings are already stripped from `path`.
pub fn drill_down(
    records: &[&LogEntry],
    target: &str,
    config: &AnalysisConfig,
) -> EndpointDrillDown {
    let matching: Vec<&LogEntry> = records
        .iter()
        .copied()
        .filter(|e| e.path == target)
        .collect();

    EndpointDrillDown {
        endpoint: target.to_string(),
        found: !matching.is_empty(),
        total_requests: matching.len() as u64,
        traffic_patterns: traffic_patterns(&matching, config),
        error_analysis: error_analysis(&matching, config),
        performance_metrics: performance_metrics(&matching, config),
        user_agent_analysis: user_agent_analysis(&matching, config),
        query_patterns: query_patterns(&matching, config),
        slowness_investigation: slowness_investigation(&matching, config),
        daily_summary: daily_summary(&matching),
    }
}
