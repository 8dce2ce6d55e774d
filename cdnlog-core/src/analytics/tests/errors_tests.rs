use crate::analytics::{ErrorEndpoint, error_analysis};
use crate::conf::AnalysisConfig;
use crate::model::LogEntry;
use crate::test_helpers::{entry, refs, ts};
use pretty_assertions::assert_eq;

#[test]
fn ten_percent_server_errors() {
    // Arrange
    let entries: Vec<LogEntry> = (0..100)
        .map(|i| entry().status(if i < 90 { 200 } else { 500 }).build())
        .collect();

    // Act
    let errors = error_analysis(&refs(&entries), &AnalysisConfig::default());

    // Assert
    assert_eq!(errors.total_requests, 100);
    assert_eq!(errors.error_5xx_count, 10);
    assert_eq!(errors.error_5xx_rate, 10.0);
    assert_eq!(errors.error_4xx_count, 0);
    assert_eq!(errors.total_error_rate, 10.0);
    assert_eq!(errors.status_code_distribution.get(&500), Some(&10));
    assert_eq!(errors.status_code_distribution.get(&200), Some(&90));
}

#[test]
fn distribution_conserves_request_count() {
    // Arrange
    let statuses = [200, 201, 301, 404, 404, 429, 500, 503, 200, 102];
    let entries: Vec<LogEntry> = statuses.iter().map(|s| entry().status(*s).build()).collect();

    // Act
    let errors = error_analysis(&refs(&entries), &AnalysisConfig::default());

    // Assert
    let total: u64 = errors.status_code_distribution.values().sum();
    assert_eq!(total, errors.total_requests);
    assert_eq!(errors.error_4xx_count, 3);
    assert_eq!(errors.error_5xx_count, 2);
    assert_eq!(errors.total_error_rate, 50.0);
}

#[test]
fn error_endpoints_rank_by_count_then_rate_then_path() {
    // Arrange
    let mut entries = Vec::new();
    // /a: 2 errors of 4; /b: 2 errors of 2; /c: 2 errors of 2; /d: 3 errors of 10
    entries.extend((0..4).map(|i| {
        let status = if i < 2 { 500 } else { 200 };
        entry().path("/a").status(status).build()
    }));
    entries.extend((0..2).map(|_| entry().path("/c").status(404).build()));
    entries.extend((0..2).map(|_| entry().path("/b").status(502).build()));
    entries.extend((0..10).map(|i| {
        let status = if i < 3 { 403 } else { 200 };
        entry().path("/d").status(status).build()
    }));
    entries.push(entry().path("/ok").build());

    // Act
    let errors = error_analysis(&refs(&entries), &AnalysisConfig::default());

    // Assert
    let order: Vec<(&str, u64, f64)> = errors
        .top_error_endpoints
        .iter()
        .map(|e| (e.path.as_str(), e.error_count, e.error_rate))
        .collect();
    assert_eq!(
        order,
        vec![
            ("/d", 3, 30.0),
            ("/b", 2, 100.0),
            ("/c", 2, 100.0),
            ("/a", 2, 50.0),
        ]
    );
    assert_eq!(
        errors.top_error_endpoints[0],
        ErrorEndpoint {
            path: "/d".to_string(),
            error_count: 3,
            request_count: 10,
            error_rate: 30.0,
        }
    );
}

#[test]
fn hourly_errors_split_by_class() {
    // Arrange
    let entries = vec![
        entry().at("2025-11-09T10:05:00Z").status(404).build(),
        entry().at("2025-11-09T10:10:00Z").status(200).build(),
        entry().at("2025-11-09T11:00:00Z").status(500).build(),
        entry().at("2025-11-09T11:59:59Z").status(500).build(),
    ];

    // Act
    let errors = error_analysis(&refs(&entries), &AnalysisConfig::default());

    // Assert
    assert_eq!(errors.hourly_errors.len(), 2);
    let first = &errors.hourly_errors[0];
    assert_eq!(first.bucket, ts("2025-11-09T10:00:00Z"));
    assert_eq!((first.total, first.count_4xx, first.rate_4xx), (2, 1, 50.0));
    let second = &errors.hourly_errors[1];
    assert_eq!((second.total, second.count_5xx, second.rate_5xx), (2, 2, 100.0));
}

#[test]
fn empty_input_has_zero_rates() {
    // Act
    let errors = error_analysis(&[], &AnalysisConfig::default());

    // Assert
    assert_eq!(errors.total_requests, 0);
    assert_eq!(errors.total_error_rate, 0.0);
    assert!(errors.hourly_errors.is_empty());
}
