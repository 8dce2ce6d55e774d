use crate::model::LogEntry;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub const SAMPLE_LINE: &str = r#"<134>2025-11-09T23:57:35Z cache-server-001 proc[1]: 192.0.2.1 "-" "-" Sun, 09 Nov 2025 23:57:35 GMT "GET /api/endpoint?param=value" 200 18508 "-" "Mozilla/5.0" hit"#;

pub fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap()
}

pub fn refs(entries: &[LogEntry]) -> Vec<&LogEntry> {
    entries.iter().collect()
}

/// Raw log line with overridable fields.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    pub priority: String,
    pub timestamp: String,
    pub request: String,
    pub status: String,
    pub size: String,
    pub user_agent: String,
    pub cache_status: String,
}

impl Default for LineBuilder {
    fn default() -> Self {
        Self {
            priority: "134".to_string(),
            timestamp: "2025-11-09T23:57:35Z".to_string(),
            request: "GET /api/endpoint?param=value".to_string(),
            status: "200".to_string(),
            size: "18508".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            cache_status: "hit".to_string(),
        }
    }
}

impl LineBuilder {
    pub fn timestamp(mut self, ts: &str) -> Self {
        self.timestamp = ts.to_string();
        self
    }

    pub fn request(mut self, request: &str) -> Self {
        self.request = request.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn size(mut self, size: &str) -> Self {
        self.size = size.to_string();
        self
    }

    pub fn build(&self) -> String {
        format!(
            r#"<{}>{} cache-server-001 proc[1]: 192.0.2.1 "-" "-" Sun, 09 Nov 2025 23:57:35 GMT "{}" {} {} "-" "{}" {}"#,
            self.priority,
            self.timestamp,
            self.request,
            self.status,
            self.size,
            self.user_agent,
            self.cache_status
        )
    }
}

/// In-memory entry with sensible defaults.
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    entry: LogEntry,
}

impl Default for EntryBuilder {
    fn default() -> Self {
        Self {
            entry: LogEntry {
                priority: 134,
                timestamp: ts("2025-11-09T12:00:00Z"),
                cache_server: "cache-server-001".to_string(),
                client_ip: "192.0.2.1".to_string(),
                http_method: "GET".to_string(),
                path: "/api/endpoint".to_string(),
                query_string: String::new(),
                query_params: BTreeMap::new(),
                status_code: 200,
                response_size: 1000,
                user_agent: "Mozilla/5.0".to_string(),
                cache_status: "hit".to_string(),
            },
        }
    }
}

impl EntryBuilder {
    pub fn at(mut self, raw: &str) -> Self {
        self.entry.timestamp = ts(raw);
        self
    }

    pub fn at_time(mut self, timestamp: DateTime<Utc>) -> Self {
        self.entry.timestamp = timestamp;
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.entry.path = path.to_string();
        self
    }

    pub fn method(mut self, method: &str) -> Self {
        self.entry.http_method = method.to_string();
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.entry.status_code = status;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.entry.response_size = size;
        self
    }

    pub fn ip(mut self, ip: &str) -> Self {
        self.entry.client_ip = ip.to_string();
        self
    }

    pub fn agent(mut self, agent: &str) -> Self {
        self.entry.user_agent = agent.to_string();
        self
    }

    pub fn cache(mut self, status: &str) -> Self {
        self.entry.cache_status = status.to_string();
        self
    }

    pub fn params(mut self, pairs: &[(&str, &str)]) -> Self {
        self.entry.query_params = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.entry.query_string = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self
    }

    pub fn build(self) -> LogEntry {
        self.entry
    }
}

pub fn entry() -> EntryBuilder {
    EntryBuilder::default()
}
