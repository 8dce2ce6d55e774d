use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_AGENTS_HCL: &str = include_str!("default_agents.hcl");

/// Tunables shared by every aggregator. Passed explicitly, never global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Length of every ranked list
    pub top_n: usize,

    /// `k` in `mean + k * stddev` for peak bucket detection
    pub peak_stddev_factor: f64,

    /// Bucket width for rate-of-change spike detection
    pub spike_granularity: Granularity,

    /// Minimum bucket-over-bucket increase, in percent, to report a spike
    pub spike_threshold_pct: f64,

    /// Sliding window length (in entries) for cache-miss clustering
    pub miss_cluster_window: usize,

    /// Share of misses in a window, `(0, 1]`, that makes it part of a cluster
    pub miss_cluster_density: f64,

    /// Responses strictly above this size percentile count as large
    pub large_response_percentile: f64,

    /// Percentiles reported in response-size summaries
    pub size_percentiles: Vec<f64>,

    /// Requests with more query parameters than this are "complex"
    pub complex_query_params: usize,

    /// Classify devices with the woothee user-agent engine
    pub device_detection: bool,

    /// Run aggregators on scoped worker threads
    pub parallel: bool,

    /// Category for user agents no keyword matched
    pub fallback_category: String,

    /// Ordered keyword table; first matching category wins
    pub agent_categories: Vec<AgentCategory>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            peak_stddev_factor: 2.0,
            spike_granularity: Granularity::FiveMinutes,
            spike_threshold_pct: 100.0,
            miss_cluster_window: 20,
            miss_cluster_density: 0.8,
            large_response_percentile: 99.0,
            size_percentiles: vec![50.0, 95.0, 99.0],
            complex_query_params: 5,
            device_detection: true,
            parallel: true,
            fallback_category: "unknown".to_string(),
            agent_categories: default_agent_categories(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

impl AgentCategory {
    /// Case-insensitive substring match against an already lowercased agent.
    pub fn matches(&self, agent_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| agent_lower.contains(&k.to_lowercase()))
    }
}

#[derive(Deserialize)]
struct AgentTable {
    agent_categories: Vec<AgentCategory>,
}

/// The bundled keyword table.
pub fn default_agent_categories() -> Vec<AgentCategory> {
    hcl::from_str::<AgentTable>(DEFAULT_AGENTS_HCL)
        .expect("bundled default_agents.hcl is valid")
        .agent_categories
}

/// Fixed-width UTC time bucket.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Minute,
    #[default]
    FiveMinutes,
    Hour,
    Day,
}

impl Granularity {
    pub fn seconds(self) -> i64 {
        match self {
            Granularity::Minute => 60,
            Granularity::FiveMinutes => 300,
            Granularity::Hour => 3_600,
            Granularity::Day => 86_400,
        }
    }

    pub fn width(self) -> TimeDelta {
        TimeDelta::seconds(self.seconds())
    }

    /// Start of the bucket containing `ts`.
    pub fn truncate(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let t = ts.timestamp();
        let floored = t - t.rem_euclid(self.seconds());
        DateTime::from_timestamp(floored, 0).unwrap_or(ts)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::FiveMinutes => "five_minutes",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
        }
    }
}
