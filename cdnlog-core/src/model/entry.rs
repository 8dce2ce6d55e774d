use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One successfully parsed access-log line.
///
/// Field names and order match the parsed-record schema, so the serde
/// representation doubles as the JSON output format and the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// syslog priority
    pub priority: u32,
    pub timestamp: DateTime<Utc>,
    pub cache_server: String,
    #[serde(rename = "ip_address")]
    pub client_ip: String,
    pub http_method: String,
    /// Request path with the query string stripped
    pub path: String,
    /// Raw text after `?`, empty if absent
    pub query_string: String,
    pub query_params: BTreeMap<String, String>,
    pub status_code: u16,
    pub response_size: u64,
    pub user_agent: String,
    pub cache_status: String,
}

impl LogEntry {
    /// `-` and empty user agents carry no information.
    pub fn has_user_agent(&self) -> bool {
        !self.user_agent.is_empty() && self.user_agent != "-"
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }

    pub fn cache_outcome(&self) -> CacheOutcome {
        CacheOutcome::classify(&self.cache_status)
    }
}

/// Coarse classification of the CDN cache-status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    Other,
    Unclassified,
}

impl CacheOutcome {
    /// Prefix match, case-insensitive: `HIT-STALE` is a hit, `MISS-CLUSTER` a miss.
    pub fn classify(status: &str) -> Self {
        let status = status.trim();
        if status.is_empty() || status == "-" {
            return CacheOutcome::Unclassified;
        }

        let lower = status.to_ascii_lowercase();
        if lower.starts_with("hit") {
            CacheOutcome::Hit
        } else if lower.starts_with("miss") {
            CacheOutcome::Miss
        } else {
            CacheOutcome::Other
        }
    }

    pub fn is_classified(self) -> bool {
        !matches!(self, CacheOutcome::Unclassified)
    }
}
