use crate::conf::{ConfigError, validate_hours};
use crate::model::LogEntry;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// A borrowed, order-preserving subset of a record collection.
#[derive(Debug, Clone)]
pub struct WindowView<'a> {
    pub entries: Vec<&'a LogEntry>,
    pub bounds: Option<WindowBounds>,
}

/// The trailing window that produced a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowBounds {
    pub hours: f64,
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
}

impl<'a> WindowView<'a> {
    /// Every entry, unfiltered.
    pub fn all<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LogEntry>,
    {
        Self {
            entries: entries.into_iter().collect(),
            bounds: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keeps entries with `timestamp >= now - hours`, in their original order.
///
/// Entries newer than `now` are kept. Non-positive or non-finite `hours`
/// is a configuration error.
pub fn filter_window<'a, I>(
    entries: I,
    now: DateTime<Utc>,
    hours: f64,
) -> Result<WindowView<'a>, ConfigError>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    validate_hours(hours)?;

    // Millisecond resolution keeps fractional hours exact enough for
    // second-precision timestamps.
    let span_ms = (hours * 3_600_000.0).round() as i64;
    let cutoff = TimeDelta::try_milliseconds(span_ms)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let entries = entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect();

    Ok(WindowView {
        entries,
        bounds: Some(WindowBounds { hours, now, cutoff }),
    })
}
