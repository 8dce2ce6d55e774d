use crate::ingest::{CSV_COLUMNS, load_records_json, write_records_csv, write_records_json};
use crate::parse::parse_lines;
use crate::test_helpers::{LineBuilder, SAMPLE_LINE, entry};
use pretty_assertions::assert_eq;

#[test]
fn json_records_round_trip() {
    // Arrange
    let batch = parse_lines([
        SAMPLE_LINE.to_string(),
        LineBuilder::default()
            .request("POST /api/items?tag=a%20b&tag=c&flag")
            .status("503")
            .build(),
    ]);
    let entries: Vec<_> = batch.entries().cloned().collect();

    // Act
    let mut buf = Vec::new();
    write_records_json(&entries, &mut buf).unwrap();
    let loaded = load_records_json(buf.as_slice()).unwrap();

    // Assert
    assert_eq!(loaded, entries);
}

#[test]
fn json_uses_record_field_names() {
    // Arrange
    let entries = vec![entry().ip("203.0.113.9").build()];

    // Act
    let mut buf = Vec::new();
    write_records_json(&entries, &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    // Assert
    let record = &value[0];
    assert_eq!(record["ip_address"], "203.0.113.9");
    assert_eq!(record["timestamp"], "2025-11-09T12:00:00Z");
    assert!(record.get("client_ip").is_none());
}

#[test]
fn invalid_json_is_an_error() {
    // Act
    let result = load_records_json("[{\"priority\": \"x\"}]".as_bytes());

    // Assert
    assert!(result.is_err());
}

#[test]
fn csv_has_header_and_quotes_fields() {
    // Arrange
    let entries = vec![
        entry()
            .agent("Mozilla/5.0 (X11, \"quoted\")")
            .params(&[("a", "1")])
            .build(),
    ];

    // Act
    let mut buf = Vec::new();
    write_records_csv(&entries, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    // Assert
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), CSV_COLUMNS.join(","));
    assert_eq!(
        lines.next().unwrap(),
        concat!(
            "134,2025-11-09T12:00:00Z,cache-server-001,192.0.2.1,GET,/api/endpoint,a=1,",
            "\"{\"\"a\"\":\"\"1\"\"}\",200,1000,",
            "\"Mozilla/5.0 (X11, \"\"quoted\"\")\",hit"
        )
    );
    assert!(lines.next().is_none());
}

#[test]
fn csv_of_no_entries_is_just_the_header() {
    // Act
    let mut buf = Vec::new();
    write_records_csv(std::iter::empty(), &mut buf).unwrap();

    // Assert
    assert_eq!(String::from_utf8(buf).unwrap(), format!("{}\n", CSV_COLUMNS.join(",")));
}

#[test]
fn csv_rows_read_back_field_for_field() {
    // Arrange
    let entries = vec![
        entry()
            .path("/search")
            .agent("line one\nline two, \"three\"")
            .params(&[("q", "a,b"), ("page", "2")])
            .build(),
        entry().cache("-").build(),
    ];

    // Act
    let mut buf = Vec::new();
    write_records_csv(&entries, &mut buf).unwrap();
    let mut reader = csv::Reader::from_reader(buf.as_slice());

    // Assert
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_COLUMNS.to_vec());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][5], "/search");
    assert_eq!(&rows[0][10], "line one\nline two, \"three\"");
    let params: serde_json::Value = serde_json::from_str(&rows[0][7]).unwrap();
    assert_eq!(params["q"], "a,b");
    assert_eq!(params["page"], "2");
    assert_eq!(&rows[1][11], "-");
}
