use crate::conf::Granularity;
use crate::model::LogEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Requests observed in one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: DateTime<Utc>,
    pub count: u64,
}

/// Request counts keyed by bucket start, chronological.
pub fn bucket_counts(
    records: &[&LogEntry],
    granularity: Granularity,
) -> BTreeMap<DateTime<Utc>, u64> {
    let mut counts = BTreeMap::new();
    for e in records {
        *counts.entry(granularity.truncate(e.timestamp)).or_insert(0) += 1;
    }
    counts
}

/// Records grouped by bucket start, each group in input order.
pub fn group_by_bucket<'a>(
    records: &[&'a LogEntry],
    granularity: Granularity,
) -> BTreeMap<DateTime<Utc>, Vec<&'a LogEntry>> {
    let mut groups: BTreeMap<DateTime<Utc>, Vec<&'a LogEntry>> = BTreeMap::new();
    for e in records.iter().copied() {
        groups
            .entry(granularity.truncate(e.timestamp))
            .or_default()
            .push(e);
    }
    groups
}

/// Observed buckets only.
pub fn to_series(counts: &BTreeMap<DateTime<Utc>, u64>) -> Vec<BucketCount> {
    counts
        .iter()
        .map(|(bucket, count)| BucketCount {
            bucket: *bucket,
            count: *count,
        })
        .collect()
}
