use crate::analytics::{
    DailySummary, DailySummaryAggregator, DrillDownAggregator, EndpointDrillDown, ErrorAnalysis,
    ErrorAnalysisAggregator, PerformanceAggregator, PerformanceMetrics, QueryPatternAggregator,
    QueryPatterns, SlownessAggregator, SlownessInvestigation, TrafficAggregator, TrafficPatterns,
    UserAgentAggregator, UserAgentAnalysis,
};
use crate::conf::AnalysisConfig;
use crate::model::LogEntry;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::warn;

/// One independent analytics unit: records + config in, one section out.
///
/// Implementations must be pure. They may run in any order, or concurrently.
pub trait Aggregator: Send + Sync {
    fn name(&self) -> SectionName;

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section;

    /// Zero-valued section used when [`Aggregator::aggregate`] cannot finish.
    fn empty(&self) -> Section {
        self.name().empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    TrafficPatterns,
    ErrorAnalysis,
    PerformanceMetrics,
    UserAgentAnalysis,
    QueryPatterns,
    SlownessInvestigation,
    EndpointDrillDown,
    DailySummary,
}

impl SectionName {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionName::TrafficPatterns => "traffic_patterns",
            SectionName::ErrorAnalysis => "error_analysis",
            SectionName::PerformanceMetrics => "performance_metrics",
            SectionName::UserAgentAnalysis => "user_agent_analysis",
            SectionName::QueryPatterns => "query_patterns",
            SectionName::SlownessInvestigation => "slowness_investigation",
            SectionName::EndpointDrillDown => "endpoint_drill_down",
            SectionName::DailySummary => "daily_summary",
        }
    }

    pub fn empty(self) -> Section {
        match self {
            SectionName::TrafficPatterns => Section::TrafficPatterns(TrafficPatterns::default()),
            SectionName::ErrorAnalysis => Section::ErrorAnalysis(ErrorAnalysis::default()),
            SectionName::PerformanceMetrics => {
                Section::PerformanceMetrics(PerformanceMetrics::default())
            }
            SectionName::UserAgentAnalysis => {
                Section::UserAgentAnalysis(UserAgentAnalysis::default())
            }
            SectionName::QueryPatterns => Section::QueryPatterns(QueryPatterns::default()),
            SectionName::SlownessInvestigation => {
                Section::SlownessInvestigation(SlownessInvestigation::default())
            }
            SectionName::EndpointDrillDown => Section::EndpointDrillDown(Box::default()),
            SectionName::DailySummary => Section::DailySummary(DailySummary::default()),
        }
    }
}

/// Output of one aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section {
    TrafficPatterns(TrafficPatterns),
    ErrorAnalysis(ErrorAnalysis),
    PerformanceMetrics(PerformanceMetrics),
    UserAgentAnalysis(UserAgentAnalysis),
    QueryPatterns(QueryPatterns),
    SlownessInvestigation(SlownessInvestigation),
    EndpointDrillDown(Box<EndpointDrillDown>),
    DailySummary(DailySummary),
}

impl Section {
    pub fn name(&self) -> SectionName {
        match self {
            Section::TrafficPatterns(_) => SectionName::TrafficPatterns,
            Section::ErrorAnalysis(_) => SectionName::ErrorAnalysis,
            Section::PerformanceMetrics(_) => SectionName::PerformanceMetrics,
            Section::UserAgentAnalysis(_) => SectionName::UserAgentAnalysis,
            Section::QueryPatterns(_) => SectionName::QueryPatterns,
            Section::SlownessInvestigation(_) => SectionName::SlownessInvestigation,
            Section::EndpointDrillDown(_) => SectionName::EndpointDrillDown,
            Section::DailySummary(_) => SectionName::DailySummary,
        }
    }
}

/// The fixed, ordered aggregator list. Drill-down is appended only when a
/// target path is given.
pub fn default_aggregators(endpoint: Option<&str>) -> Vec<Box<dyn Aggregator>> {
    let mut aggregators: Vec<Box<dyn Aggregator>> = vec![
        Box::new(TrafficAggregator),
        Box::new(ErrorAnalysisAggregator),
        Box::new(PerformanceAggregator),
        Box::new(UserAgentAggregator),
        Box::new(QueryPatternAggregator),
        Box::new(SlownessAggregator),
        Box::new(DailySummaryAggregator),
    ];

    if let Some(target) = endpoint {
        aggregators.push(Box::new(DrillDownAggregator::new(target)));
    }

    aggregators
}

/// Runs every aggregator over the same records, returning sections in list order.
///
/// A panicking aggregator is replaced by its empty section; the others are
/// unaffected.
pub fn run_aggregators(
    aggregators: &[Box<dyn Aggregator>],
    records: &[&LogEntry],
    config: &AnalysisConfig,
) -> Vec<Section> {
    if config.parallel && aggregators.len() > 1 {
        thread::scope(|scope| {
            let handles: Vec<_> = aggregators
                .iter()
                .map(|agg| (agg, scope.spawn(move || agg.aggregate(records, config))))
                .collect();

            handles
                .into_iter()
                .map(|(agg, handle)| handle.join().unwrap_or_else(|_| degrade(agg.as_ref())))
                .collect()
        })
    } else {
        aggregators
            .iter()
            .map(|agg| {
                panic::catch_unwind(AssertUnwindSafe(|| agg.aggregate(records, config)))
                    .unwrap_or_else(|_| degrade(agg.as_ref()))
            })
            .collect()
    }
}

fn degrade(agg: &dyn Aggregator) -> Section {
    warn!(section = agg.name().as_str(), "aggregator failed, emitting empty section");
    agg.empty()
}

