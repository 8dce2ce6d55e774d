use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unreadable analysis configuration. Always fatal, and always
/// raised before any aggregation runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    //-------------------------------------------------------------------------
    // IO / Parsing
    //-------------------------------------------------------------------------
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {path}\n\n{source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: hcl::Error,
    },

    //-------------------------------------------------------------------------
    // Values
    //-------------------------------------------------------------------------
    #[error("time window must be a positive number of hours, got {hours}")]
    InvalidHours { hours: f64 },

    #[error("top_n must be at least 1")]
    InvalidTopN,

    #[error("invalid value for '{field}': {value}")]
    InvalidThreshold { field: &'static str, value: f64 },

    #[error("invalid agent classification table ({category}): {reason}")]
    InvalidAgentTable { category: String, reason: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: hcl::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn threshold(field: &'static str, value: f64) -> Self {
        Self::InvalidThreshold { field, value }
    }

    pub(crate) fn agent_table(category: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAgentTable {
            category: category.into(),
            reason: reason.into(),
        }
    }
}
