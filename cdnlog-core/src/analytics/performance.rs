use crate::analytics::buckets::group_by_bucket;
use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::histogram::{Histogram, HistogramBucket, SIZE_BUCKETS_BYTES};
use crate::analytics::stats::{desc_f64, mean, percentile, percentile_label, rate, round};
use crate::conf::{AnalysisConfig, Granularity};
use crate::model::{CacheOutcome, LogEntry};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Raw cache-status tokens as they appear in the log
    pub cache_statistics: BTreeMap<String, u64>,
    pub classified_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub cache_miss_rate: f64,
    pub response_size: SizeSummary,
    pub size_distribution: SizeDistribution,
    pub top_endpoints_by_size: Vec<EndpointSize>,
    pub hourly_cache_performance: Vec<HourlyCache>,
    pub hourly_response_sizes: Vec<HourlySizes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeSummary {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub median: f64,
    pub percentiles: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeDistribution {
    pub buckets: Vec<HistogramBucket>,
    /// Bucket upper bound reached by each configured percentile
    pub estimates: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSize {
    pub path: String,
    pub mean_size: f64,
    pub max_size: u64,
    pub request_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyCache {
    pub bucket: DateTime<Utc>,
    pub classified: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySizes {
    pub bucket: DateTime<Utc>,
    pub requests: u64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
}

pub struct PerformanceAggregator;

impl Aggregator for PerformanceAggregator {
    fn name(&self) -> SectionName {
        SectionName::PerformanceMetrics
    }

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section {
        Section::PerformanceMetrics(performance_metrics(records, config))
    }
}

pub fn performance_metrics(records: &[&LogEntry], config: &AnalysisConfig) -> PerformanceMetrics {
    let mut cache_statistics = BTreeMap::new();
    for e in records {
        *cache_statistics.entry(e.cache_status.clone()).or_insert(0) += 1;
    }

    let cache = CacheTally::of(records);

    let mut sizes: Vec<u64> = records.iter().map(|e| e.response_size).collect();
    sizes.sort_unstable();

    let mut histogram = Histogram::new(SIZE_BUCKETS_BYTES);
    for size in &sizes {
        histogram.record(*size);
    }

    let size_distribution = SizeDistribution {
        buckets: histogram.snapshot(),
        estimates: config
            .size_percentiles
            .iter()
            .map(|p| (percentile_label(*p), histogram.percentile_estimate(*p)))
            .collect(),
    };

    let hourly_cache_performance = group_by_bucket(records, Granularity::Hour)
        .into_iter()
        .map(|(bucket, group)| {
            let tally = CacheTally::of(&group);
            HourlyCache {
                bucket,
                classified: tally.classified,
                hits: tally.hits,
                misses: tally.misses,
                hit_rate: rate(tally.hits, tally.classified),
                miss_rate: rate(tally.misses, tally.classified),
            }
        })
        .collect();

    let hourly_response_sizes = group_by_bucket(records, Granularity::Hour)
        .into_iter()
        .map(|(bucket, group)| {
            let mut sizes: Vec<u64> = group.iter().map(|e| e.response_size).collect();
            sizes.sort_unstable();
            HourlySizes {
                bucket,
                requests: sizes.len() as u64,
                mean: round(mean(&sizes)),
                median: round(percentile(&sizes, 50.0)),
                p95: round(percentile(&sizes, 95.0)),
            }
        })
        .collect();

    PerformanceMetrics {
        cache_statistics,
        classified_requests: cache.classified,
        cache_hits: cache.hits,
        cache_misses: cache.misses,
        cache_hit_rate: rate(cache.hits, cache.classified),
        cache_miss_rate: rate(cache.misses, cache.classified),
        response_size: size_summary(&sizes, &config.size_percentiles),
        size_distribution,
        top_endpoints_by_size: endpoints_by_size(records, config.top_n),
        hourly_cache_performance,
        hourly_response_sizes,
    }
}

/// Summary over an ascending slice of sizes.
pub fn size_summary(sorted: &[u64], percentiles: &[f64]) -> SizeSummary {
    if sorted.is_empty() {
        return SizeSummary::default();
    }

    SizeSummary {
        count: sorted.len() as u64,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: round(mean(sorted)),
        median: round(percentile(sorted, 50.0)),
        percentiles: percentiles
            .iter()
            .map(|p| (percentile_label(*p), round(percentile(sorted, *p))))
            .collect(),
    }
}

fn endpoints_by_size(records: &[&LogEntry], n: usize) -> Vec<EndpointSize> {
    // path -> (total bytes, max, requests)
    let mut per_path: AHashMap<&str, (u128, u64, u64)> = AHashMap::new();
    for e in records {
        let slot = per_path.entry(e.path.as_str()).or_insert((0, 0, 0));
        slot.0 += u128::from(e.response_size);
        slot.1 = slot.1.max(e.response_size);
        slot.2 += 1;
    }

    let mut ranked: Vec<EndpointSize> = per_path
        .into_iter()
        .map(|(path, (bytes, max, requests))| EndpointSize {
            path: path.to_string(),
            mean_size: round(bytes as f64 / requests as f64),
            max_size: max,
            request_count: requests,
        })
        .collect();
    ranked.sort_by(|a, b| {
        desc_f64(a.mean_size, b.mean_size).then_with(|| a.path.cmp(&b.path))
    });
    ranked.truncate(n);
    ranked
}

#[derive(Default)]
struct CacheTally {
    classified: u64,
    hits: u64,
    misses: u64,
}

impl CacheTally {
    fn of(records: &[&LogEntry]) -> Self {
        let mut tally = Self::default();
        for e in records {
            let outcome = e.cache_outcome();
            if !outcome.is_classified() {
                continue;
            }
            tally.classified += 1;
            match outcome {
                CacheOutcome::Hit => tally.hits += 1,
                CacheOutcome::Miss => tally.misses += 1,
                CacheOutcome::Other | CacheOutcome::Unclassified => {}
            }
        }
        tally
    }
}
