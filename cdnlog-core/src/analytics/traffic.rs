use crate::analytics::buckets::{BucketCount, bucket_counts, to_series};
use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::stats::{RankedCount, count_by, mean_stddev, rank_counts, round};
use crate::conf::{AnalysisConfig, Granularity};
use crate::model::LogEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficPatterns {
    pub total_requests: u64,
    pub unique_client_ips: u64,
    pub requests_per_minute: Vec<BucketCount>,
    pub requests_per_hour: Vec<BucketCount>,
    pub requests_per_day: Vec<BucketCount>,
    pub top_endpoints: Vec<RankedCount>,
    pub http_methods: BTreeMap<String, u64>,
    pub peaks: TrafficPeaks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficPeaks {
    pub threshold_factor: f64,
    pub minute: PeakSet,
    pub hour: PeakSet,
}

/// Buckets whose count exceeds `mean + k * stddev` of all observed buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeakSet {
    pub mean: f64,
    pub stddev: f64,
    pub threshold: f64,
    /// Smallest bucket count above the unrounded threshold
    pub min_count: u64,
    pub buckets: Vec<BucketCount>,
}

pub struct TrafficAggregator;

impl Aggregator for TrafficAggregator {
    fn name(&self) -> SectionName {
        SectionName::TrafficPatterns
    }

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section {
        Section::TrafficPatterns(traffic_patterns(records, config))
    }
}

pub fn traffic_patterns(records: &[&LogEntry], config: &AnalysisConfig) -> TrafficPatterns {
    if records.is_empty() {
        return TrafficPatterns {
            peaks: TrafficPeaks {
                threshold_factor: config.peak_stddev_factor,
                ..TrafficPeaks::default()
            },
            ..TrafficPatterns::default()
        };
    }

    let per_minute = bucket_counts(records, Granularity::Minute);
    let per_hour = bucket_counts(records, Granularity::Hour);
    let per_day = bucket_counts(records, Granularity::Day);

    let endpoints = count_by(records, |e| e.path.as_str());
    let methods = count_by(records, |e| e.http_method.as_str());
    let ips: BTreeSet<&str> = records.iter().map(|e| e.client_ip.as_str()).collect();

    let k = config.peak_stddev_factor;

    TrafficPatterns {
        total_requests: records.len() as u64,
        unique_client_ips: ips.len() as u64,
        requests_per_minute: to_series(&per_minute),
        requests_per_hour: to_series(&per_hour),
        requests_per_day: to_series(&per_day),
        top_endpoints: rank_counts(endpoints, config.top_n),
        http_methods: methods
            .into_iter()
            .map(|(m, c)| (m.to_string(), c))
            .collect(),
        peaks: TrafficPeaks {
            threshold_factor: k,
            minute: peak_set(&per_minute, k),
            hour: peak_set(&per_hour, k),
        },
    }
}

fn peak_set(counts: &BTreeMap<DateTime<Utc>, u64>, k: f64) -> PeakSet {
    let values: Vec<u64> = counts.values().copied().collect();
    let (mean, stddev) = mean_stddev(&values);
    let threshold = mean + k * stddev;
    // Counts are integers, so `count > threshold` is `count >= min_count`.
    let min_count = threshold.max(0.0).floor() as u64 + 1;

    let buckets = counts
        .iter()
        .filter(|(_, count)| **count >= min_count)
        .map(|(bucket, count)| BucketCount {
            bucket: *bucket,
            count: *count,
        })
        .collect();

    PeakSet {
        mean: round(mean),
        stddev: round(stddev),
        threshold: round(threshold),
        min_count,
        buckets,
    }
}
