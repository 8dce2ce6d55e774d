//! Access-log line parsing.
//!
//! Each raw line is tokenized into bare and double-quoted tokens, matched
//! against the fixed field layout, and either becomes a [`LogEntry`] or a
//! [`ParseFailure`] carrying the first rule it broke:
//!
//! ```text
//! <priority>timestamp host process[pid]: client_ip "-" "-" date "METHOD path[?query]" status size "-" "user-agent" cache_status
//! ```
//!
//! The batch parser never aborts: failures are collected next to entries and
//! summarized in [`ParseStats`].
//!
//! [`LogEntry`]: crate::model::LogEntry
//! [`ParseFailure`]: crate::model::ParseFailure

mod batch;
mod line;
mod query;

pub use batch::*;
pub use line::parse_line;
pub use query::*;
