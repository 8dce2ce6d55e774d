use crate::analytics::buckets::{BucketCount, bucket_counts};
use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::stats::{desc_f64, percentile, rate, round};
use crate::conf::{AnalysisConfig, Granularity};
use crate::model::{CacheOutcome, LogEntry};
use ahash::AHashMap;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

/// Signals that usually accompany slow responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlownessInvestigation {
    /// Requests per hour of day (0-23, UTC), observed hours only
    pub requests_by_hour: BTreeMap<u32, u64>,
    pub requests_by_day_of_week: Vec<DayOfWeekCount>,
    pub peak_hour: Option<PeakHour>,
    pub peak_minute: Option<BucketCount>,
    pub traffic_spikes: TrafficSpikes,
    pub cache_miss_clusters: Vec<MissCluster>,
    pub large_responses: LargeResponses,
    pub top_client_ips: Vec<ClientIpVolume>,
    pub complex_query_endpoints: Vec<ComplexQueryEndpoint>,
    pub high_cache_miss_endpoints: Vec<EndpointRate>,
    pub high_error_rate_endpoints: Vec<EndpointRate>,
    pub top_ips_by_request_rate: Vec<ClientIpRate>,
    pub user_agent_response_sizes: Vec<AgentResponseSize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOfWeekCount {
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakHour {
    pub hour: u32,
    pub requests: u64,
}

/// Share of a path's requests matching some condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointRate {
    pub path: String,
    pub request_count: u64,
    pub count: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientIpRate {
    pub ip: String,
    pub total_requests: u64,
    pub time_span_minutes: f64,
    pub requests_per_minute: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponseSize {
    pub user_agent: String,
    pub request_count: u64,
    pub mean_size: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficSpikes {
    pub granularity: Granularity,
    pub threshold_pct: f64,
    pub spikes: Vec<TrafficSpike>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSpike {
    pub bucket: DateTime<Utc>,
    pub previous: u64,
    pub current: u64,
    pub change_pct: f64,
}

/// A run of time-ordered entries dominated by cache misses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissCluster {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub entries: u64,
    pub misses: u64,
    pub density: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LargeResponses {
    pub percentile: f64,
    pub threshold_bytes: f64,
    pub outlier_count: u64,
    pub outlier_percentage: f64,
    pub endpoints: Vec<LargeResponseEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargeResponseEndpoint {
    pub path: String,
    pub count: u64,
    pub mean_size: f64,
    pub max_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientIpVolume {
    pub ip: String,
    pub request_count: u64,
    pub unique_user_agents: u64,
    pub top_user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexQueryEndpoint {
    pub path: String,
    pub request_count: u64,
    pub mean_params: f64,
    pub max_params: u64,
}

pub struct SlownessAggregator;

impl Aggregator for SlownessAggregator {
    fn name(&self) -> SectionName {
        SectionName::SlownessInvestigation
    }

    fn aggregate(&self, records: &[&LogEntry], config: &AnalysisConfig) -> Section {
        Section::SlownessInvestigation(slowness_investigation(records, config))
    }
}

pub fn slowness_investigation(
    records: &[&LogEntry],
    config: &AnalysisConfig,
) -> SlownessInvestigation {
    let by_hour = requests_by_hour(records);
    let peak_hour = by_hour
        .iter()
        .max_by(|(ha, ca), (hb, cb)| ca.cmp(cb).then_with(|| hb.cmp(ha)))
        .map(|(hour, requests)| PeakHour {
            hour: *hour,
            requests: *requests,
        });

    SlownessInvestigation {
        requests_by_hour: by_hour,
        peak_hour,
        requests_by_day_of_week: requests_by_day_of_week(records),
        peak_minute: peak_minute(records),
        traffic_spikes: traffic_spikes(records, config),
        cache_miss_clusters: miss_clusters(
            records,
            config.miss_cluster_window,
            config.miss_cluster_density,
        ),
        large_responses: large_responses(records, config),
        top_client_ips: top_client_ips(records, config.top_n),
        complex_query_endpoints: complex_query_endpoints(records, config),
        high_cache_miss_endpoints: high_cache_miss_endpoints(records, config.top_n),
        high_error_rate_endpoints: high_error_rate_endpoints(records, config.top_n),
        top_ips_by_request_rate: top_ips_by_request_rate(records, config.top_n),
        user_agent_response_sizes: user_agent_response_sizes(records, config.top_n),
    }
}

/// Bucket-over-bucket increases above the configured threshold.
///
/// Only adjacent observed buckets are compared. A missing bucket counts as 0,
/// and a change from 0 is undefined, so gaps never produce spikes.
pub fn traffic_spikes(records: &[&LogEntry], config: &AnalysisConfig) -> TrafficSpikes {
    let granularity = config.spike_granularity;
    let counts = bucket_counts(records, granularity);
    let width = granularity.width();

    let mut spikes: Vec<TrafficSpike> = counts
        .iter()
        .zip(counts.iter().skip(1))
        .filter(|((prev_at, _), (at, _))| **at - **prev_at == width)
        .filter_map(|((_, prev), (at, curr))| {
            let change = (*curr as f64 - *prev as f64) / *prev as f64 * 100.0;
            (change > config.spike_threshold_pct).then(|| TrafficSpike {
                bucket: *at,
                previous: *prev,
                current: *curr,
                change_pct: round(change),
            })
        })
        .collect();
    spikes.sort_by(|a, b| {
        desc_f64(a.change_pct, b.change_pct).then_with(|| a.bucket.cmp(&b.bucket))
    });
    spikes.truncate(config.top_n);

    TrafficSpikes {
        granularity,
        threshold_pct: config.spike_threshold_pct,
        spikes,
    }
}

/// Sliding-window miss clustering over entries in timestamp order.
///
/// Every window of `window` consecutive entries whose miss share reaches
/// `density` is marked. Overlapping or adjacent marked windows merge, and the
/// merged span is trimmed to its first and last miss.
pub fn miss_clusters(records: &[&LogEntry], window: usize, density: f64) -> Vec<MissCluster> {
    if window == 0 || records.len() < window {
        return Vec::new();
    }

    let mut ordered: Vec<&LogEntry> = records.to_vec();
    ordered.sort_by_key(|e| e.timestamp);
    let is_miss: Vec<bool> = ordered
        .iter()
        .map(|e| e.cache_outcome() == CacheOutcome::Miss)
        .collect();

    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut misses = is_miss[..window].iter().filter(|m| **m).count();

    for start in 0..=ordered.len() - window {
        if start > 0 {
            if is_miss[start - 1] {
                misses -= 1;
            }
            if is_miss[start + window - 1] {
                misses += 1;
            }
        }

        if misses == 0 || (misses as f64 / window as f64) < density {
            continue;
        }

        let end = start + window - 1;
        match spans.last_mut() {
            Some((_, last_end)) if start <= *last_end + 1 => *last_end = end,
            _ => spans.push((start, end)),
        }
    }

    spans
        .into_iter()
        .filter_map(|(start, end)| {
            let first = (start..=end).find(|i| is_miss[*i])?;
            let last = (start..=end).rev().find(|i| is_miss[*i])?;
            let entries = (last - first + 1) as u64;
            let misses = is_miss[first..=last].iter().filter(|m| **m).count() as u64;
            Some(MissCluster {
                start: ordered[first].timestamp,
                end: ordered[last].timestamp,
                entries,
                misses,
                density: round(misses as f64 / entries as f64),
            })
        })
        .collect()
}

pub fn large_responses(records: &[&LogEntry], config: &AnalysisConfig) -> LargeResponses {
    let pct = config.large_response_percentile;
    if records.is_empty() {
        return LargeResponses {
            percentile: pct,
            ..LargeResponses::default()
        };
    }

    let mut sizes: Vec<u64> = records.iter().map(|e| e.response_size).collect();
    sizes.sort_unstable();
    let threshold = percentile(&sizes, pct);

    // path -> (count, total bytes, max)
    let mut per_path: AHashMap<&str, (u64, u128, u64)> = AHashMap::new();
    let mut outliers = 0;
    for e in records.iter().filter(|e| e.response_size as f64 > threshold) {
        outliers += 1;
        let slot = per_path.entry(e.path.as_str()).or_insert((0, 0, 0));
        slot.0 += 1;
        slot.1 += u128::from(e.response_size);
        slot.2 = slot.2.max(e.response_size);
    }

    let mut endpoints: Vec<LargeResponseEndpoint> = per_path
        .into_iter()
        .map(|(path, (count, bytes, max))| LargeResponseEndpoint {
            path: path.to_string(),
            count,
            mean_size: round(bytes as f64 / count as f64),
            max_size: max,
        })
        .collect();
    endpoints.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
    endpoints.truncate(config.top_n);

    LargeResponses {
        percentile: pct,
        threshold_bytes: round(threshold),
        outlier_count: outliers,
        outlier_percentage: rate(outliers, records.len() as u64),
        endpoints,
    }
}

/// Highest-volume clients; equal volumes keep first-seen order.
pub fn top_client_ips(records: &[&LogEntry], n: usize) -> Vec<ClientIpVolume> {
    struct Client<'a> {
        requests: u64,
        // agent -> (count, first seen)
        agents: AHashMap<&'a str, (u64, usize)>,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut clients: AHashMap<&str, Client<'_>> = AHashMap::new();

    for (idx, e) in records.iter().enumerate() {
        let client = clients.entry(e.client_ip.as_str()).or_insert_with(|| {
            order.push(e.client_ip.as_str());
            Client {
                requests: 0,
                agents: AHashMap::new(),
            }
        });
        client.requests += 1;
        if e.has_user_agent() {
            client
                .agents
                .entry(e.user_agent.as_str())
                .or_insert((0, idx))
                .0 += 1;
        }
    }

    let mut ranked: Vec<ClientIpVolume> = order
        .into_iter()
        .filter_map(|ip| {
            let client = clients.get(ip)?;
            let top_user_agent = client
                .agents
                .iter()
                .min_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then_with(|| fa.cmp(fb)))
                .map(|(agent, _)| agent.to_string());
            Some(ClientIpVolume {
                ip: ip.to_string(),
                request_count: client.requests,
                unique_user_agents: client.agents.len() as u64,
                top_user_agent,
            })
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.request_count.cmp(&a.request_count));
    ranked.truncate(n);
    ranked
}

pub fn complex_query_endpoints(
    records: &[&LogEntry],
    config: &AnalysisConfig,
) -> Vec<ComplexQueryEndpoint> {
    // path -> (requests, total params, max params)
    let mut per_path: AHashMap<&str, (u64, u64, u64)> = AHashMap::new();
    for e in records {
        let params = e.query_params.len() as u64;
        if params <= config.complex_query_params as u64 {
            continue;
        }
        let slot = per_path.entry(e.path.as_str()).or_insert((0, 0, 0));
        slot.0 += 1;
        slot.1 += params;
        slot.2 = slot.2.max(params);
    }

    let mut ranked: Vec<ComplexQueryEndpoint> = per_path
        .into_iter()
        .map(|(path, (requests, total, max))| ComplexQueryEndpoint {
            path: path.to_string(),
            request_count: requests,
            mean_params: round(total as f64 / requests as f64),
            max_params: max,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.request_count
            .cmp(&a.request_count)
            .then_with(|| a.path.cmp(&b.path))
    });
    ranked.truncate(config.top_n);
    ranked
}

//-----------------------------------------------------------------------------
// Time of day
//-----------------------------------------------------------------------------

pub fn requests_by_hour(records: &[&LogEntry]) -> BTreeMap<u32, u64> {
    let mut hours = BTreeMap::new();
    for e in records {
        *hours.entry(e.timestamp.hour()).or_insert(0) += 1;
    }
    hours
}

/// Observed weekdays, Monday first.
pub fn requests_by_day_of_week(records: &[&LogEntry]) -> Vec<DayOfWeekCount> {
    let mut days = [0u64; 7];
    for e in records {
        days[e.timestamp.weekday().num_days_from_monday() as usize] += 1;
    }

    let mut day = Weekday::Mon;
    let mut out = Vec::new();
    for count in days {
        if count > 0 {
            out.push(DayOfWeekCount {
                day: weekday_name(day).to_string(),
                count,
            });
        }
        day = day.succ();
    }
    out
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Busiest minute bucket; the earliest wins a tie.
pub fn peak_minute(records: &[&LogEntry]) -> Option<BucketCount> {
    bucket_counts(records, Granularity::Minute)
        .into_iter()
        .max_by(|(ta, ca), (tb, cb)| ca.cmp(cb).then_with(|| tb.cmp(ta)))
        .map(|(bucket, count)| BucketCount { bucket, count })
}

//-----------------------------------------------------------------------------
// Per-path rates
//-----------------------------------------------------------------------------

/// Paths ranked by cache-miss rate over their classified requests.
pub fn high_cache_miss_endpoints(records: &[&LogEntry], n: usize) -> Vec<EndpointRate> {
    endpoint_rates(
        records,
        |e| e.cache_outcome().is_classified(),
        |e| e.cache_outcome() == CacheOutcome::Miss,
        n,
    )
}

/// Paths ranked by 4xx/5xx rate over all their requests.
pub fn high_error_rate_endpoints(records: &[&LogEntry], n: usize) -> Vec<EndpointRate> {
    endpoint_rates(records, |_| true, |e| e.is_error(), n)
}

/// Share of `matches` among the `counted` requests of each path, ranked by
/// rate desc, then request count desc, then path asc. Paths with no match
/// are left out.
fn endpoint_rates<C, M>(
    records: &[&LogEntry],
    counted: C,
    matches: M,
    n: usize,
) -> Vec<EndpointRate>
where
    C: Fn(&LogEntry) -> bool,
    M: Fn(&LogEntry) -> bool,
{
    // path -> (requests, matching)
    let mut per_path: AHashMap<&str, (u64, u64)> = AHashMap::new();
    for e in records.iter().copied().filter(|e| counted(*e)) {
        let slot = per_path.entry(e.path.as_str()).or_insert((0, 0));
        slot.0 += 1;
        if matches(e) {
            slot.1 += 1;
        }
    }

    let mut ranked: Vec<EndpointRate> = per_path
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(path, (requests, count))| EndpointRate {
            path: path.to_string(),
            request_count: requests,
            count,
            rate: rate(count, requests),
        })
        .collect();
    ranked.sort_by(|a, b| {
        desc_f64(a.rate, b.rate)
            .then_with(|| b.request_count.cmp(&a.request_count))
            .then_with(|| a.path.cmp(&b.path))
    });
    ranked.truncate(n);
    ranked
}

//-----------------------------------------------------------------------------
// Per-client and per-agent
//-----------------------------------------------------------------------------

/// Clients ranked by requests per minute over their active span.
///
/// A span under one minute (including a single request) counts as one
/// minute. Ties go to the higher total, then to first-seen order.
pub fn top_ips_by_request_rate(records: &[&LogEntry], n: usize) -> Vec<ClientIpRate> {
    // ip -> (requests, first, last)
    let mut order: Vec<&str> = Vec::new();
    let mut spans: AHashMap<&str, (u64, DateTime<Utc>, DateTime<Utc>)> = AHashMap::new();
    for e in records {
        let slot = spans.entry(e.client_ip.as_str()).or_insert_with(|| {
            order.push(e.client_ip.as_str());
            (0, e.timestamp, e.timestamp)
        });
        slot.0 += 1;
        slot.1 = slot.1.min(e.timestamp);
        slot.2 = slot.2.max(e.timestamp);
    }

    let mut ranked: Vec<(ClientIpRate, f64)> = order
        .into_iter()
        .filter_map(|ip| {
            let (requests, first, last) = spans.get(ip)?;
            let minutes = (*last - *first).num_milliseconds() as f64 / 60_000.0;
            let minutes = if minutes < 1.0 { 1.0 } else { minutes };
            let per_minute = *requests as f64 / minutes;
            Some((
                ClientIpRate {
                    ip: ip.to_string(),
                    total_requests: *requests,
                    time_span_minutes: round(minutes),
                    requests_per_minute: round(per_minute),
                },
                per_minute,
            ))
        })
        .collect();
    // Stable sort on the unrounded rate keeps first-seen order among ties.
    ranked.sort_by(|(a, ra), (b, rb)| {
        desc_f64(*ra, *rb).then_with(|| b.total_requests.cmp(&a.total_requests))
    });
    ranked.truncate(n);
    ranked.into_iter().map(|(ip, _)| ip).collect()
}

/// Agents ranked by mean response size, then request count desc, then
/// agent asc. Empty and `-` agents are left out.
pub fn user_agent_response_sizes(records: &[&LogEntry], n: usize) -> Vec<AgentResponseSize> {
    // agent -> (requests, total bytes)
    let mut per_agent: AHashMap<&str, (u64, u128)> = AHashMap::new();
    for e in records.iter().filter(|e| e.has_user_agent()) {
        let slot = per_agent.entry(e.user_agent.as_str()).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += u128::from(e.response_size);
    }

    let mut ranked: Vec<(AgentResponseSize, f64)> = per_agent
        .into_iter()
        .map(|(agent, (requests, bytes))| {
            let mean = bytes as f64 / requests as f64;
            (
                AgentResponseSize {
                    user_agent: agent.to_string(),
                    request_count: requests,
                    mean_size: round(mean),
                },
                mean,
            )
        })
        .collect();
    ranked.sort_by(|(a, ma), (b, mb)| {
        desc_f64(*ma, *mb)
            .then_with(|| b.request_count.cmp(&a.request_count))
            .then_with(|| a.user_agent.cmp(&b.user_agent))
    });
    ranked.truncate(n);
    ranked.into_iter().map(|(agent, _)| agent).collect()
}
