use crate::analytics::buckets::group_by_bucket;
use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::stats::{desc_f64, rate};
use crate::conf::{AnalysisConfig, Granularity};
use crate::model::LogEntry;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorAnalysis {
    pub total_requests: u64,
    pub status_code_distribution: BTreeMap<u16, u64>,
    pub error_4xx_count: u64,
    pub error_4xx_rate: f64,
    pub error_5xx_count: u64,
    pub error_5xx_rate: f64,
    pub total_error_rate: f64,
    pub top_error_endpoints: Vec<ErrorEndpoint>,
    pub hourly_errors: Vec<HourlyErrors>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEndpoint {
    pub path: String,
    pub error_count: u64,
    pub request_count: u64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyErrors {
    pub bucket: DateTime<Utc>,
    pub total: u64,
    pub count_4xx: u64,
    pub rate_4xx: f64,
    pub count_5xx: u64,
    pub rate_5xx: f64,
}

pub struct ErrorAnalysisAggregator;

impl Aggregator for ErrorAnalysisAggregator {
    fn name(&self) -> SectionName {
        SectionName::ErrorAnalysis
    }

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section {
        Section::ErrorAnalysis(error_analysis(records, config))
    }
}

pub fn error_analysis(records: &[&LogEntry], config: &AnalysisConfig) -> ErrorAnalysis {
    let total = records.len() as u64;

    let mut distribution = BTreeMap::new();
    let mut count_4xx = 0;
    let mut count_5xx = 0;
    // path -> (errors, requests)
    let mut per_path: AHashMap<&str, (u64, u64)> = AHashMap::new();

    for e in records {
        *distribution.entry(e.status_code).or_insert(0) += 1;
        if e.is_client_error() {
            count_4xx += 1;
        } else if e.is_server_error() {
            count_5xx += 1;
        }

        let slot = per_path.entry(e.path.as_str()).or_insert((0, 0));
        slot.1 += 1;
        if e.is_error() {
            slot.0 += 1;
        }
    }

    let mut top_error_endpoints: Vec<ErrorEndpoint> = per_path
        .into_iter()
        .filter(|(_, (errors, _))| *errors > 0)
        .map(|(path, (errors, requests))| ErrorEndpoint {
            path: path.to_string(),
            error_count: errors,
            request_count: requests,
            error_rate: rate(errors, requests),
        })
        .collect();
    top_error_endpoints.sort_by(|a, b| {
        b.error_count
            .cmp(&a.error_count)
            .then_with(|| desc_f64(a.error_rate, b.error_rate))
            .then_with(|| a.path.cmp(&b.path))
    });
    top_error_endpoints.truncate(config.top_n);

    let hourly_errors = group_by_bucket(records, Granularity::Hour)
        .into_iter()
        .map(|(bucket, group)| {
            let total = group.len() as u64;
            let c4 = group.iter().filter(|e| e.is_client_error()).count() as u64;
            let c5 = group.iter().filter(|e| e.is_server_error()).count() as u64;
            HourlyErrors {
                bucket,
                total,
                count_4xx: c4,
                rate_4xx: rate(c4, total),
                count_5xx: c5,
                rate_5xx: rate(c5, total),
            }
        })
        .collect();

    ErrorAnalysis {
        total_requests: total,
        status_code_distribution: distribution,
        error_4xx_count: count_4xx,
        error_4xx_rate: rate(count_4xx, total),
        error_5xx_count: count_5xx,
        error_5xx_rate: rate(count_5xx, total),
        total_error_rate: rate(count_4xx + count_5xx, total),
        top_error_endpoints,
        hourly_errors,
    }
}
