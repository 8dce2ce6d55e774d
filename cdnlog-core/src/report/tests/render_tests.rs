use crate::analytics::{default_aggregators, run_aggregators};
use crate::conf::AnalysisConfig;
use crate::model::LogEntry;
use crate::parse::ParseStats;
use crate::report::{
    AnalyticsReport, ReportFormat, ReportMetadata, assemble, render, render_json, render_text,
};
use crate::test_helpers::{entry, refs};
use pretty_assertions::assert_eq;

fn report_for(entries: &[LogEntry], endpoint: Option<&str>) -> AnalyticsReport {
    let config = AnalysisConfig::default();
    let records = refs(entries);
    let sections = run_aggregators(&default_aggregators(endpoint), &records, &config);
    let stats = ParseStats {
        total_lines: entries.len(),
        parsed: entries.len(),
        ..ParseStats::default()
    };
    assemble(sections, ReportMetadata::new(&stats, records.len(), None))
}

fn ninety_ten() -> Vec<LogEntry> {
    (0..100)
        .map(|i| entry().status(if i < 90 { 200 } else { 500 }).build())
        .collect()
}

#[test]
fn json_has_fixed_top_level_keys() {
    // Arrange
    let report = report_for(&ninety_ten(), None);

    // Act
    let json = render_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    // Assert
    let mut keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "daily_summary",
            "endpoint_drill_down",
            "error_analysis",
            "metadata",
            "performance_metrics",
            "query_patterns",
            "slowness_investigation",
            "traffic_patterns",
            "user_agent_analysis",
        ]
    );
    assert!(value["endpoint_drill_down"].is_null());
    assert_eq!(value["error_analysis"]["error_5xx_rate"], 10.0);
    assert_eq!(value["error_analysis"]["status_code_distribution"]["500"], 10);
}

#[test]
fn text_and_json_agree_on_rates() {
    // Arrange
    let report = report_for(&ninety_ten(), None);

    // Act
    let text = render_text(&report, false);

    // Assert
    assert!(text.contains("5xx: 10 (10.00%)"), "{text}");
    assert!(text.contains("status codes: 200=90 500=10"), "{text}");
}

#[test]
fn text_lists_time_patterns_and_per_path_rates() {
    // Arrange
    let report = report_for(&ninety_ten(), None);

    // Act
    let text = render_text(&report, false);

    // Assert
    assert!(text.contains("peak hour: 12:00 (100 requests)"), "{text}");
    assert!(text.contains("by weekday: Sunday=100"), "{text}");
    assert!(text.contains("   10.00%  10/100  /api/endpoint"), "{text}");
    assert!(text.contains("codes: 200=90.00% 500=10.00%"), "{text}");
}

#[test]
fn peak_lines_state_the_integer_cutoff() {
    // Arrange: nine quiet minutes and one burst of 20
    let mut entries: Vec<LogEntry> = (0..9)
        .map(|m| entry().at(&format!("2025-11-09T12:0{m}:00Z")).build())
        .collect();
    entries.extend((0..20).map(|_| entry().at("2025-11-09T12:09:30Z").build()));
    let report = report_for(&entries, None);

    // Act
    let text = render_text(&report, false);

    // Assert
    assert!(
        text.contains("peak minutes (count >= 15; threshold 14.30 = mean 2.90"),
        "{text}"
    );
    assert!(text.contains("  2025-11-09T12:09:00+00:00  20"), "{text}");
}

#[test]
fn styled_text_adds_ansi_codes_only_when_asked() {
    // Arrange
    let report = report_for(&ninety_ten(), None);

    // Act
    let plain = render_text(&report, false);
    let styled = render_text(&report, true);

    // Assert
    assert!(!plain.contains('\u{1b}'));
    assert!(styled.contains('\u{1b}'));
}

#[test]
fn drill_down_is_serialized_when_requested() {
    // Arrange
    let mut entries = ninety_ten();
    entries.push(entry().path("/target").status(404).build());

    // Act
    let report = report_for(&entries, Some("/target"));

    // Assert
    let drill = report.endpoint_drill_down.as_ref().unwrap();
    assert!(drill.found);
    assert_eq!(drill.total_requests, 1);
    assert_eq!(drill.error_analysis.error_4xx_rate, 100.0);
    let text = render(&report, ReportFormat::Text).unwrap();
    assert!(text.contains("Endpoint Drill-Down: /target"));
}

#[test]
fn empty_report_is_flagged_and_renders() {
    // Arrange
    let report = report_for(&[], Some("/missing"));

    // Act
    let json = render(&report, ReportFormat::Json).unwrap();
    let text = render(&report, ReportFormat::Text).unwrap();

    // Assert
    assert!(report.metadata.no_data);
    assert!(json.contains("\"no_data\": true"));
    assert!(text.contains("<no entries to analyze>"));
    let drill = report.endpoint_drill_down.unwrap();
    assert!(!drill.found);
    assert_eq!(drill.endpoint, "/missing");
}

#[test]
fn report_format_parses_case_insensitively() {
    assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
    assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
    assert!("yaml".parse::<ReportFormat>().is_err());
}
