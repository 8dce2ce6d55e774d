use crate::analytics::engine::{Aggregator, Section, SectionName};
use crate::analytics::stats::rate;
use crate::conf::AnalysisConfig;
use crate::model::LogEntry;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

const STATUS_CLASSES: [&str; 5] = ["1xx", "2xx", "3xx", "4xx", "5xx"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySummary {
    pub total_requests: u64,
    pub date_range: Option<DateRange>,
    pub days: Vec<DaySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_requests: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub status_percentages: BTreeMap<u16, f64>,
    /// Always carries all five classes, zero when unseen
    pub status_classes: BTreeMap<String, u64>,
    pub status_class_percentages: BTreeMap<String, f64>,
}

pub struct DailySummaryAggregator;

impl Aggregator for DailySummaryAggregator {
    fn name(&self) -> SectionName {
        SectionName::DailySummary
    }

    fn aggregate(&self, records: &[&LogEntry], _config: &AnalysisConfig) -> Section {
        Section::DailySummary(daily_summary(records))
    }
}

pub fn daily_summary(records: &[&LogEntry]) -> DailySummary {
    let mut per_day: BTreeMap<NaiveDate, BTreeMap<u16, u64>> = BTreeMap::new();
    for e in records {
        *per_day
            .entry(e.timestamp.date_naive())
            .or_default()
            .entry(e.status_code)
            .or_insert(0) += 1;
    }

    let date_range = match (per_day.keys().next(), per_day.keys().next_back()) {
        (Some(start), Some(end)) => Some(DateRange {
            start: *start,
            end: *end,
        }),
        _ => None,
    };

    let days = per_day
        .into_iter()
        .map(|(date, status_codes)| day_summary(date, status_codes))
        .collect();

    DailySummary {
        total_requests: records.len() as u64,
        date_range,
        days,
    }
}

fn day_summary(date: NaiveDate, status_codes: BTreeMap<u16, u64>) -> DaySummary {
    let total: u64 = status_codes.values().sum();

    let mut classes: BTreeMap<String, u64> = STATUS_CLASSES
        .iter()
        .map(|c| (c.to_string(), 0))
        .collect();
    for (code, count) in &status_codes {
        if let Some(slot) = classes.get_mut(&format!("{}xx", code / 100)) {
            *slot += count;
        }
    }

    let status_percentages = status_codes
        .iter()
        .map(|(code, count)| (*code, rate(*count, total)))
        .collect();

    let status_class_percentages = classes
        .iter()
        .map(|(class, count)| (class.clone(), rate(*count, total)))
        .collect();

    DaySummary {
        date,
        total_requests: total,
        status_codes,
        status_percentages,
        status_classes: classes,
        status_class_percentages,
    }
}
