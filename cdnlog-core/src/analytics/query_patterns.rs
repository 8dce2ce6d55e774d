use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::stats::{RankedCount, rank_counts};
use crate::conf::AnalysisConfig;
use crate::model::LogEntry;
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryPatterns {
    pub entries_with_query: u64,
    /// Every parameter name seen, not truncated
    pub parameter_frequency: Vec<RankedCount>,
    pub parameter_values: BTreeMap<String, Vec<RankedCount>>,
    pub query_signatures: Vec<QuerySignature>,
}

/// A path together with the sorted set of parameter names it was called with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySignature {
    pub path: String,
    pub parameters: Vec<String>,
    pub count: u64,
}

pub struct QueryPatternAggregator;

impl Aggregator for QueryPatternAggregator {
    fn name(&self) -> SectionName {
        SectionName::QueryPatterns
    }

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section {
        Section::QueryPatterns(query_patterns(records, config))
    }
}

pub fn query_patterns(records: &[&LogEntry], config: &AnalysisConfig) -> QueryPatterns {
    let mut entries_with_query = 0;
    let mut names: AHashMap<&str, u64> = AHashMap::new();
    let mut values: AHashMap<&str, AHashMap<&str, u64>> = AHashMap::new();
    let mut signatures: AHashMap<(&str, Vec<&str>), u64> = AHashMap::new();

    for e in records {
        if e.query_params.is_empty() {
            continue;
        }
        entries_with_query += 1;

        for (name, value) in &e.query_params {
            *names.entry(name.as_str()).or_insert(0) += 1;
            *values
                .entry(name.as_str())
                .or_default()
                .entry(value.as_str())
                .or_insert(0) += 1;
        }

        // BTreeMap keys are already sorted.
        let params: Vec<&str> = e.query_params.keys().map(String::as_str).collect();
        *signatures.entry((e.path.as_str(), params)).or_insert(0) += 1;
    }

    let parameter_frequency = rank_counts(names, usize::MAX);

    let parameter_values = values
        .into_iter()
        .map(|(name, counts)| (name.to_string(), rank_counts(counts, config.top_n)))
        .collect();

    let mut query_signatures: Vec<QuerySignature> = signatures
        .into_iter()
        .map(|((path, params), count)| QuerySignature {
            path: path.to_string(),
            parameters: params.into_iter().map(str::to_string).collect(),
            count,
        })
        .collect();
    query_signatures.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.parameters.cmp(&b.parameters))
    });
    query_signatures.truncate(config.top_n);

    QueryPatterns {
        entries_with_query,
        parameter_frequency,
        parameter_values,
        query_signatures,
    }
}
