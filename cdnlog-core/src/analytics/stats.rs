use ahash::AHashMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::hash::Hash;

/// Decimal places kept for every rate and derived float in a report.
pub const RATE_PRECISION: i32 = 2;

/// Rounds to [`RATE_PRECISION`] places. Non-finite input becomes 0.
pub fn round(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10f64.powi(RATE_PRECISION);
    (value * scale).round() / scale
}

/// `part / total` as a rounded percentage; 0 when `total` is 0.
pub fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round(part as f64 / total as f64 * 100.0)
}

/// Unrounded arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

/// Population mean and standard deviation, unrounded.
pub fn mean_stddev(values: &[u64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let d = *v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    (mean, variance.sqrt())
}

/// Linear interpolation between closest ranks over an ascending slice.
///
/// `p` is in percent. Empty input yields 0.
pub fn percentile(sorted: &[u64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0] as f64,
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] as f64 + (sorted[upper] as f64 - sorted[lower] as f64) * weight
        }
    }
}

/// Report label for a percentile, e.g. `p95` or `p99.9`.
pub fn percentile_label(p: f64) -> String {
    format!("p{p}")
}

/// A key with its occurrence count in a ranked list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCount {
    pub key: String,
    pub count: u64,
}

impl RankedCount {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Count descending, ties by key ascending, at most `n` items.
pub fn rank_counts<K, I>(counts: I, n: usize) -> Vec<RankedCount>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, u64)>,
{
    let mut ranked: Vec<RankedCount> = counts
        .into_iter()
        .map(|(k, c)| RankedCount::new(k, c))
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    ranked.truncate(n);
    ranked
}

/// Occurrence counter over borrowed keys.
pub fn count_by<'a, T, K, F>(items: &[&'a T], key: F) -> AHashMap<K, u64>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let mut counts = AHashMap::new();
    for item in items.iter().copied() {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Descending float order that never panics on NaN.
pub fn desc_f64(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
