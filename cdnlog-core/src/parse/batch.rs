use crate::model::{LogEntry, ParseFailure, ParseFailureReason};
use crate::parse::line::parse_line_detailed;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome for one non-blank input line, in input order.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Entry(LogEntry),
    Failure(ParseFailure),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub blank_lines: usize,
    pub parsed: usize,
    pub failed: usize,
    pub invalid_timestamps: usize,
    pub invalid_query_strings: usize,
    pub failures_by_reason: BTreeMap<ParseFailureReason, usize>,
}

impl ParseStats {
    fn record_failure(&mut self, reason: ParseFailureReason) {
        self.failed += 1;
        if reason == ParseFailureReason::BadTimestamp {
            self.invalid_timestamps += 1;
        }
        *self.failures_by_reason.entry(reason).or_insert(0) += 1;
    }

    fn merge(&mut self, other: &ParseStats) {
        self.total_lines += other.total_lines;
        self.blank_lines += other.blank_lines;
        self.parsed += other.parsed;
        self.failed += other.failed;
        self.invalid_timestamps += other.invalid_timestamps;
        self.invalid_query_strings += other.invalid_query_strings;
        for (reason, count) in &other.failures_by_reason {
            *self.failures_by_reason.entry(*reason).or_insert(0) += count;
        }
    }
}

/// Entries and failures from one or more sources.
#[derive(Debug, Clone, Default)]
pub struct ParseBatch {
    outcomes: Vec<ParsedLine>,
    stats: ParseStats,
}

impl ParseBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps records that were parsed earlier (e.g. reloaded from JSON).
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        let stats = ParseStats {
            total_lines: entries.len(),
            parsed: entries.len(),
            ..ParseStats::default()
        };

        Self {
            outcomes: entries.into_iter().map(ParsedLine::Entry).collect(),
            stats,
        }
    }

    /// Parses and records one raw line. Blank lines are counted and skipped.
    pub fn push_line(&mut self, line_number: usize, line: &str) {
        self.stats.total_lines += 1;

        if line.trim().is_empty() {
            self.stats.blank_lines += 1;
            return;
        }

        match parse_line_detailed(line) {
            Ok(parsed) => {
                self.stats.parsed += 1;
                if parsed.query_malformed {
                    self.stats.invalid_query_strings += 1;
                    debug!(line_number, "kept entry with malformed query string");
                }
                self.outcomes.push(ParsedLine::Entry(parsed.entry));
            }
            Err(reason) => {
                debug!(line_number, %reason, "rejected log line");
                self.stats.record_failure(reason);
                self.outcomes.push(ParsedLine::Failure(
                    ParseFailure::new(reason, line.trim_end()).at_line(line_number),
                ));
            }
        }
    }

    pub fn extend(&mut self, other: ParseBatch) {
        self.stats.merge(&other.stats);
        self.outcomes.extend(other.outcomes);
    }

    pub fn outcomes(&self) -> &[ParsedLine] {
        &self.outcomes
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.outcomes.iter().filter_map(|o| match o {
            ParsedLine::Entry(e) => Some(e),
            ParsedLine::Failure(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &ParseFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            ParsedLine::Failure(f) => Some(f),
            ParsedLine::Entry(_) => None,
        })
    }
}

/// Parses a sequence of lines, numbering them from 1.
pub fn parse_lines<I, S>(lines: I) -> ParseBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut batch = ParseBatch::new();
    for (idx, line) in lines.into_iter().enumerate() {
        batch.push_line(idx + 1, line.as_ref());
    }
    batch
}
