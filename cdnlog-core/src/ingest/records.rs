use crate::ingest::error::IngestError;
use crate::model::LogEntry;
use std::io::{Read, Write};

/// Column order of tabular output. Matches the JSON record schema.
pub const CSV_COLUMNS: [&str; 12] = [
    "priority",
    "timestamp",
    "cache_server",
    "ip_address",
    "http_method",
    "path",
    "query_string",
    "query_params",
    "status_code",
    "response_size",
    "user_agent",
    "cache_status",
];

/// Writes entries as a pretty-printed JSON array.
pub fn write_records_json<'a, I, W>(entries: I, mut writer: W) -> Result<(), IngestError>
where
    I: IntoIterator<Item = &'a LogEntry>,
    W: Write,
{
    let entries: Vec<&LogEntry> = entries.into_iter().collect();
    serde_json::to_writer_pretty(&mut writer, &entries)?;
    writer.write_all(b"\n").map_err(IngestError::Write)?;
    writer.flush().map_err(IngestError::Write)
}

/// Reads a JSON array previously produced by [`write_records_json`].
pub fn load_records_json<R: Read>(reader: R) -> Result<Vec<LogEntry>, IngestError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a header row plus one RFC 4180 row per entry.
///
/// `query_params` is embedded as a JSON object string.
pub fn write_records_csv<'a, I, W>(entries: I, writer: W) -> Result<(), IngestError>
where
    I: IntoIterator<Item = &'a LogEntry>,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;

    for entry in entries {
        let params = serde_json::to_string(&entry.query_params)?;
        let row = [
            entry.priority.to_string(),
            entry.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            entry.cache_server.clone(),
            entry.client_ip.clone(),
            entry.http_method.clone(),
            entry.path.clone(),
            entry.query_string.clone(),
            params,
            entry.status_code.to_string(),
            entry.response_size.to_string(),
            entry.user_agent.clone(),
            entry.cache_status.clone(),
        ];
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(IngestError::Write)
}
