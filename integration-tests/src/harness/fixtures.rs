use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for one well-formed access-log line.
#[derive(Debug, Clone)]
pub struct LogLine {
    timestamp: DateTime<Utc>,
    client_ip: String,
    method: String,
    target: String,
    status: u16,
    size: u64,
    user_agent: String,
    cache_status: String,
}

impl LogLine {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            client_ip: "192.0.2.1".to_string(),
            method: "GET".to_string(),
            target: "/api/endpoint?param=value".to_string(),
            status: 200,
            size: 18508,
            user_agent: "Mozilla/5.0".to_string(),
            cache_status: "hit".to_string(),
        }
    }

    pub fn ip(mut self, ip: &str) -> Self {
        self.client_ip = ip.to_string();
        self
    }

    pub fn request(mut self, method: &str, target: &str) -> Self {
        self.method = method.to_string();
        self.target = target.to_string();
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn agent(mut self, agent: &str) -> Self {
        self.user_agent = agent.to_string();
        self
    }

    pub fn cache(mut self, status: &str) -> Self {
        self.cache_status = status.to_string();
        self
    }

    pub fn render(&self) -> String {
        format!(
            r#"<134>{} cache-server-001 varnishncsa[42]: {} "-" "-" {} "{} {}" {} {} "-" "{}" {}"#,
            self.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            self.client_ip,
            self.timestamp.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.method,
            self.target,
            self.status,
            self.size,
            self.user_agent,
            self.cache_status
        )
    }
}

/// Temporary directory of log files. Removed on drop.
pub struct LogDir {
    dir: TempDir,
}

impl LogDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn write(&self, name: &str, lines: &[String]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, lines.join("\n") + "\n").expect("failed to write log file");
        path
    }

    pub fn write_gz(&self, name: &str, lines: &[String]) -> PathBuf {
        let path = self.dir.path().join(name);
        let file = File::create(&path).expect("failed to create log file");
        let mut encoder = GzEncoder::new(file, Compression::default());
        for line in lines {
            writeln!(encoder, "{line}").expect("failed to write gz line");
        }
        encoder.finish().expect("failed to finish gz stream");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for LogDir {
    fn default() -> Self {
        Self::new()
    }
}
