use crate::analytics::device::DeviceDetector;
use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::stats::{RankedCount, rank_counts};
use crate::conf::{AgentCategory, AnalysisConfig};
use crate::model::LogEntry;
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserAgentAnalysis {
    pub unique_user_agents: u64,
    pub top_user_agents: Vec<RankedCount>,
    pub categories: BTreeMap<String, u64>,
    /// Empty when device detection is disabled
    pub device_types: BTreeMap<String, u64>,
}

/// Assigns a user agent to the first category with a matching keyword.
pub struct AgentClassifier<'a> {
    categories: &'a [AgentCategory],
    fallback: &'a str,
}

impl<'a> AgentClassifier<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            categories: &config.agent_categories,
            fallback: &config.fallback_category,
        }
    }

    pub fn classify(&self, user_agent: &str) -> &'a str {
        if user_agent.is_empty() || user_agent == "-" {
            return self.fallback;
        }

        let lower = user_agent.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.matches(&lower))
            .map_or(self.fallback, |c| c.name.as_str())
    }
}

pub struct UserAgentAggregator;

impl Aggregator for UserAgentAggregator {
    fn name(&self) -> SectionName {
        SectionName::UserAgentAnalysis
    }

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section {
        Section::UserAgentAnalysis(user_agent_analysis(records, config))
    }
}

pub fn user_agent_analysis(records: &[&LogEntry], config: &AnalysisConfig) -> UserAgentAnalysis {
    let classifier = AgentClassifier::new(config);
    let detector = config.device_detection.then(DeviceDetector::new);

    // One classification per distinct agent string.
    let mut agents: AHashMap<&str, u64> = AHashMap::new();
    for e in records {
        *agents.entry(e.user_agent.as_str()).or_insert(0) += 1;
    }

    let mut categories = BTreeMap::new();
    let mut device_types = BTreeMap::new();
    for (agent, count) in &agents {
        *categories
            .entry(classifier.classify(agent).to_string())
            .or_insert(0) += count;

        if let Some(detector) = &detector {
            *device_types
                .entry(detector.detect(agent).as_str().to_string())
                .or_insert(0) += count;
        }
    }

    let informative: Vec<(&str, u64)> = agents
        .into_iter()
        .filter(|(agent, _)| !agent.is_empty() && *agent != "-")
        .collect();

    UserAgentAnalysis {
        unique_user_agents: informative.len() as u64,
        top_user_agents: rank_counts(informative, config.top_n),
        categories,
        device_types,
    }
}
