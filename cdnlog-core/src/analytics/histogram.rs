use serde::Serialize;

/// Upper bounds of the response-size buckets, in bytes.
pub const SIZE_BUCKETS_BYTES: &[u64] = &[1 << 10, 10 << 10, 100 << 10, 1 << 20, 10 << 20];

/// Fixed-bound histogram with a trailing overflow bucket.
#[derive(Debug, Clone)]
pub struct Histogram {
    buckets: &'static [u64],
    counts: Vec<u64>,
}

/// One labelled bucket of a histogram snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub label: String,
    /// Inclusive upper bound; `None` for the overflow bucket
    pub upper_bytes: Option<u64>,
    pub count: u64,
    pub share: f64,
}

impl Histogram {
    pub fn new(buckets: &'static [u64]) -> Self {
        Self {
            buckets,
            counts: vec![0; buckets.len() + 1], // +∞ bucket
        }
    }

    pub fn record(&mut self, value: u64) {
        let idx = self
            .buckets
            .iter()
            .position(|b| value <= *b)
            .unwrap_or(self.buckets.len());
        self.counts[idx] += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn snapshot(&self) -> Vec<HistogramBucket> {
        let total = self.total();

        self.counts
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let lower = i.checked_sub(1).map(|p| self.buckets[p]);
                let label = match (lower, self.buckets.get(i)) {
                    (None, Some(upper)) => format!("0–{}", human_bytes(*upper)),
                    (Some(lower), Some(upper)) => {
                        format!("{}–{}", human_bytes(lower), human_bytes(*upper))
                    }
                    (Some(lower), None) => format!(">{}", human_bytes(lower)),
                    (None, None) => "all".to_string(),
                };

                HistogramBucket {
                    label,
                    upper_bytes: self.buckets.get(i).copied(),
                    count: *count,
                    share: super::stats::rate(*count, total),
                }
            })
            .collect()
    }

    /// Upper bound of the bucket holding the `pct`-th percentile.
    ///
    /// Values in the overflow bucket report one past the last real bound.
    pub fn percentile_estimate(&self, pct: f64) -> u64 {
        let total = self.total();
        if total == 0 {
            return 0;
        }

        let target = ((total as f64 * pct.clamp(0.0, 100.0) / 100.0).ceil() as u64).max(1);
        let mut running = 0;

        for (i, count) in self.counts.iter().enumerate() {
            running += *count;
            if running >= target {
                return match self.buckets.get(i) {
                    Some(upper) => *upper,
                    None => self.buckets.last().map_or(0, |b| b.saturating_add(1)),
                };
            }
        }

        0
    }
}

pub(crate) fn human_bytes(bytes: u64) -> String {
    match bytes {
        b if b >= 1 << 20 && b % (1 << 20) == 0 => format!("{}MiB", b >> 20),
        b if b >= 1 << 10 && b % (1 << 10) == 0 => format!("{}KiB", b >> 10),
        b => format!("{b}B"),
    }
}
