use crate::analytics::{
    DailySummary, EndpointDrillDown, ErrorAnalysis, PerformanceMetrics, QueryPatterns,
    RankedCount, SlownessInvestigation, TrafficPatterns, UserAgentAnalysis,
};
use crate::report::{AnalyticsReport, ReportMetadata};
use owo_colors::OwoColorize;
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

/// Console layout of a report. `styled` adds ANSI colors.
///
/// Every float is printed with two decimals, matching the rounding applied
/// before serialization.
pub fn render_text(report: &AnalyticsReport, styled: bool) -> String {
    let mut out = Painter::new(styled);

    out.title("CDN Access Log Report");
    metadata(&mut out, &report.metadata);

    if report.metadata.no_data {
        out.line("  <no entries to analyze>");
        return out.finish();
    }

    traffic(&mut out, &report.traffic_patterns);
    errors(&mut out, &report.error_analysis);
    performance(&mut out, &report.performance_metrics);
    user_agents(&mut out, &report.user_agent_analysis);
    queries(&mut out, &report.query_patterns);
    slowness(&mut out, &report.slowness_investigation);
    daily(&mut out, &report.daily_summary);

    if let Some(drill) = &report.endpoint_drill_down {
        drill_down(&mut out, drill);
    }

    out.finish()
}

struct Painter {
    buf: String,
    styled: bool,
}

impl Painter {
    fn new(styled: bool) -> Self {
        Self {
            buf: String::new(),
            styled,
        }
    }

    fn title(&mut self, text: &str) {
        let underline = "=".repeat(text.chars().count());
        if self.styled {
            let _ = writeln!(self.buf, "{}\n{}", text.bold(), underline.dimmed());
        } else {
            let _ = writeln!(self.buf, "{text}\n{underline}");
        }
    }

    fn heading(&mut self, text: &str) {
        self.buf.push('\n');
        if self.styled {
            let _ = writeln!(self.buf, "{}", text.cyan().bold());
        } else {
            let _ = writeln!(self.buf, "{text}");
        }
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Highlights a rate; red above `alert`.
    fn rate(&self, value: f64, alert: f64) -> String {
        let text = format!("{value:.2}%");
        if !self.styled {
            text
        } else if value > alert {
            text.red().bold().to_string()
        } else {
            text.green().to_string()
        }
    }

    fn ranked(&mut self, items: &[RankedCount]) {
        if items.is_empty() {
            self.line("  <none>");
            return;
        }
        for item in items {
            self.line(&format!("  {:>8}  {}", item.count, item.key));
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn bar(share: f64) -> String {
    let cells = ((share / 100.0) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.min(BAR_WIDTH))
}

fn metadata(out: &mut Painter, meta: &ReportMetadata) {
    out.line(&format!(
        "lines: {} | blank: {} | parsed: {} | failed: {} | analyzed: {}",
        meta.total_lines,
        meta.blank_lines,
        meta.parsed_entries,
        meta.parse_failures,
        meta.analyzed_entries
    ));
    out.line(&format!(
        "invalid timestamps: {} | invalid query strings: {}",
        meta.invalid_timestamps, meta.invalid_query_strings
    ));
    for (reason, count) in &meta.failures_by_reason {
        out.line(&format!("  {reason}: {count}"));
    }
    if let Some(window) = &meta.window {
        out.line(&format!(
            "window: last {:.2}h ({} .. {})",
            window.hours,
            window.cutoff.to_rfc3339(),
            window.now.to_rfc3339()
        ));
    }
}

fn traffic(out: &mut Painter, t: &TrafficPatterns) {
    out.heading("Traffic Patterns");
    out.line(&format!(
        "requests: {} | unique client IPs: {}",
        t.total_requests, t.unique_client_ips
    ));

    let methods: Vec<String> = t.http_methods.iter().map(|(m, c)| format!("{m}={c}")).collect();
    out.line(&format!("methods: {}", methods.join(" ")));

    out.line("top endpoints:");
    out.ranked(&t.top_endpoints);

    for (label, set) in [("minute", &t.peaks.minute), ("hour", &t.peaks.hour)] {
        out.line(&format!(
            "peak {label}s (count >= {}; threshold {:.2} = mean {:.2} + {:.2} x stddev {:.2}): {}",
            set.min_count,
            set.threshold,
            set.mean,
            t.peaks.threshold_factor,
            set.stddev,
            set.buckets.len()
        ));
        for b in &set.buckets {
            out.line(&format!("  {}  {}", b.bucket.to_rfc3339(), b.count));
        }
    }
}

fn errors(out: &mut Painter, e: &ErrorAnalysis) {
    out.heading("Error Analysis");
    let (rate_4xx, rate_5xx, total_rate) = (
        out.rate(e.error_4xx_rate, 5.0),
        out.rate(e.error_5xx_rate, 1.0),
        out.rate(e.total_error_rate, 5.0),
    );
    out.line(&format!(
        "4xx: {} ({rate_4xx}) | 5xx: {} ({rate_5xx}) | total error rate: {total_rate}",
        e.error_4xx_count, e.error_5xx_count
    ));

    let codes: Vec<String> = e
        .status_code_distribution
        .iter()
        .map(|(code, count)| format!("{code}={count}"))
        .collect();
    out.line(&format!("status codes: {}", codes.join(" ")));

    out.line("top error endpoints:");
    if e.top_error_endpoints.is_empty() {
        out.line("  <none>");
    }
    for ep in &e.top_error_endpoints {
        out.line(&format!(
            "  {:>8}  {:>7.2}%  {}",
            ep.error_count, ep.error_rate, ep.path
        ));
    }
}

fn performance(out: &mut Painter, p: &PerformanceMetrics) {
    out.heading("Performance Metrics");
    out.line(&format!(
        "cache hit rate: {:.2}% | miss rate: {:.2}% ({} classified)",
        p.cache_hit_rate, p.cache_miss_rate, p.classified_requests
    ));

    let size = &p.response_size;
    let percentiles: Vec<String> = size
        .percentiles
        .iter()
        .map(|(label, value)| format!("{label}={value:.2}"))
        .collect();
    out.line(&format!(
        "response size: min {} | max {} | mean {:.2} | median {:.2} | {}",
        size.min,
        size.max,
        size.mean,
        size.median,
        percentiles.join(" ")
    ));

    out.line("size distribution:");
    for bucket in &p.size_distribution.buckets {
        out.line(&format!(
            "  {:<12} {:<20} {:>6.2}%",
            bucket.label,
            bar(bucket.share),
            bucket.share
        ));
    }

    out.line("largest endpoints (mean bytes):");
    for ep in &p.top_endpoints_by_size {
        out.line(&format!(
            "  {:>12.2}  max {:>10}  {}",
            ep.mean_size, ep.max_size, ep.path
        ));
    }
}

fn user_agents(out: &mut Painter, u: &UserAgentAnalysis) {
    out.heading("User Agents");
    out.line(&format!("unique user agents: {}", u.unique_user_agents));
    out.ranked(&u.top_user_agents);

    let categories: Vec<String> = u.categories.iter().map(|(c, n)| format!("{c}={n}")).collect();
    out.line(&format!("categories: {}", categories.join(" ")));

    if !u.device_types.is_empty() {
        let devices: Vec<String> = u.device_types.iter().map(|(d, n)| format!("{d}={n}")).collect();
        out.line(&format!("devices: {}", devices.join(" ")));
    }
}

fn queries(out: &mut Painter, q: &QueryPatterns) {
    out.heading("Query Patterns");
    out.line(&format!("entries with query: {}", q.entries_with_query));
    out.line("parameters:");
    out.ranked(&q.parameter_frequency);
    for (name, values) in &q.parameter_values {
        let values: Vec<String> = values.iter().map(|v| format!("{}={}", v.key, v.count)).collect();
        out.line(&format!("  {name}: {}", values.join(" ")));
    }
    out.line("signatures:");
    for sig in &q.query_signatures {
        out.line(&format!(
            "  {:>8}  {} [{}]",
            sig.count,
            sig.path,
            sig.parameters.join(", ")
        ));
    }
}

fn slowness(out: &mut Painter, s: &SlownessInvestigation) {
    out.heading("Slowness Investigation");

    if let Some(peak) = &s.peak_hour {
        out.line(&format!("peak hour: {:02}:00 ({} requests)", peak.hour, peak.requests));
    }
    if let Some(peak) = &s.peak_minute {
        out.line(&format!(
            "peak minute: {} ({} requests)",
            peak.bucket.to_rfc3339(),
            peak.count
        ));
    }
    let hours: Vec<String> = s
        .requests_by_hour
        .iter()
        .map(|(h, c)| format!("{h:02}={c}"))
        .collect();
    out.line(&format!("by hour: {}", hours.join(" ")));
    let weekdays: Vec<String> = s
        .requests_by_day_of_week
        .iter()
        .map(|d| format!("{}={}", d.day, d.count))
        .collect();
    out.line(&format!("by weekday: {}", weekdays.join(" ")));

    let spikes = &s.traffic_spikes;
    out.line(&format!(
        "traffic spikes ({} buckets, > {:.2}%): {}",
        spikes.granularity.as_str(),
        spikes.threshold_pct,
        spikes.spikes.len()
    ));
    for spike in &spikes.spikes {
        out.line(&format!(
            "  {}  {} -> {}  (+{:.2}%)",
            spike.bucket.to_rfc3339(),
            spike.previous,
            spike.current,
            spike.change_pct
        ));
    }

    out.line(&format!("cache miss clusters: {}", s.cache_miss_clusters.len()));
    for c in &s.cache_miss_clusters {
        out.line(&format!(
            "  {} .. {}  {}/{} misses (density {:.2})",
            c.start.to_rfc3339(),
            c.end.to_rfc3339(),
            c.misses,
            c.entries,
            c.density
        ));
    }

    let large = &s.large_responses;
    out.line(&format!(
        "large responses (> p{} = {:.2} bytes): {} ({:.2}%)",
        large.percentile, large.threshold_bytes, large.outlier_count, large.outlier_percentage
    ));
    for ep in &large.endpoints {
        out.line(&format!("  {:>8}  {}", ep.count, ep.path));
    }

    out.line("top client IPs:");
    for ip in &s.top_client_ips {
        out.line(&format!(
            "  {:>8}  {} ({} agents, top: {})",
            ip.request_count,
            ip.ip,
            ip.unique_user_agents,
            ip.top_user_agent.as_deref().unwrap_or("-")
        ));
    }

    out.line("top client IPs by request rate:");
    for ip in &s.top_ips_by_request_rate {
        out.line(&format!(
            "  {:>10.2}/min  {} ({} over {:.2} min)",
            ip.requests_per_minute, ip.ip, ip.total_requests, ip.time_span_minutes
        ));
    }

    for (label, rates) in [
        ("high cache miss endpoints:", &s.high_cache_miss_endpoints),
        ("high error rate endpoints:", &s.high_error_rate_endpoints),
    ] {
        out.line(label);
        if rates.is_empty() {
            out.line("  <none>");
        }
        for r in rates {
            out.line(&format!(
                "  {:>7.2}%  {}/{}  {}",
                r.rate, r.count, r.request_count, r.path
            ));
        }
    }

    out.line("mean response size by user agent:");
    for agent in &s.user_agent_response_sizes {
        out.line(&format!(
            "  {:>12.2}  {:>8}  {}",
            agent.mean_size, agent.request_count, agent.user_agent
        ));
    }

    if !s.complex_query_endpoints.is_empty() {
        out.line("complex query endpoints:");
        for ep in &s.complex_query_endpoints {
            out.line(&format!(
                "  {:>8}  {} (mean {:.2}, max {} params)",
                ep.request_count, ep.path, ep.mean_params, ep.max_params
            ));
        }
    }
}

fn daily(out: &mut Painter, d: &DailySummary) {
    out.heading("Daily Summary");
    if let Some(range) = &d.date_range {
        out.line(&format!("{} .. {}", range.start, range.end));
    }
    for day in &d.days {
        let classes: Vec<String> = day
            .status_class_percentages
            .iter()
            .map(|(class, pct)| format!("{class}={pct:.2}%"))
            .collect();
        let codes: Vec<String> = day
            .status_percentages
            .iter()
            .map(|(code, pct)| format!("{code}={pct:.2}%"))
            .collect();
        out.line(&format!(
            "  {}  {:>8}  {}",
            day.date,
            day.total_requests,
            classes.join(" ")
        ));
        out.line(&format!("              codes: {}", codes.join(" ")));
    }
}

fn drill_down(out: &mut Painter, d: &EndpointDrillDown) {
    out.heading(&format!("Endpoint Drill-Down: {}", d.endpoint));
    if !d.found {
        out.line("  <no requests for this endpoint>");
        return;
    }
    out.line(&format!("requests: {}", d.total_requests));
    traffic(out, &d.traffic_patterns);
    errors(out, &d.error_analysis);
    performance(out, &d.performance_metrics);
    user_agents(out, &d.user_agent_analysis);
    queries(out, &d.query_patterns);
    slowness(out, &d.slowness_investigation);
    daily(out, &d.daily_summary);
}
