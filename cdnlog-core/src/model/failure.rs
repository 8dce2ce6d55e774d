use serde::Serialize;
use std::fmt;

/// Why a line was rejected by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailureReason {
    BadPriority,
    BadTimestamp,
    BadRequestLine,
    BadStatusOrSize,
    FieldCountMismatch,
}

impl ParseFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseFailureReason::BadPriority => "bad_priority",
            ParseFailureReason::BadTimestamp => "bad_timestamp",
            ParseFailureReason::BadRequestLine => "bad_request_line",
            ParseFailureReason::BadStatusOrSize => "bad_status_or_size",
            ParseFailureReason::FieldCountMismatch => "field_count_mismatch",
        }
    }
}

impl fmt::Display for ParseFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line that did not satisfy the grammar. Never fatal to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    /// 1-based line number within its source; 0 when parsed standalone
    pub line_number: usize,
    pub reason: ParseFailureReason,
    pub line: String,
}

impl ParseFailure {
    pub fn new(reason: ParseFailureReason, line: &str) -> Self {
        Self {
            line_number: 0,
            reason,
            line: line.to_string(),
        }
    }

    pub fn at_line(mut self, line_number: usize) -> Self {
        self.line_number = line_number;
        self
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.reason)
    }
}

impl std::error::Error for ParseFailure {}
