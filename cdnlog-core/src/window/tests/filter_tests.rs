use crate::conf::ConfigError;
use crate::model::LogEntry;
use crate::test_helpers::{entry, ts};
use crate::window::{WindowView, filter_window};
use chrono::TimeDelta;
use pretty_assertions::assert_eq;

/// `count` entries spread evenly over the 24 hours ending at `end`.
fn uniform_day(count: i64, end: &str) -> Vec<LogEntry> {
    let end = ts(end);
    let step = 86_400 / count;
    (0..count)
        .map(|i| {
            entry()
                .at_time(end - TimeDelta::seconds((count - 1 - i) * step))
                .build()
        })
        .collect()
}

#[test]
fn trailing_hour_of_a_uniform_day() {
    // Arrange
    let entries = uniform_day(1000, "2025-11-09T23:59:00Z");
    let now = entries.last().unwrap().timestamp;

    // Act
    let view = filter_window(&entries, now, 1.0).unwrap();

    // Assert
    let cutoff = now - TimeDelta::hours(1);
    let expected = entries.iter().filter(|e| e.timestamp >= cutoff).count();
    assert_eq!(view.len(), expected);
    assert!(view.entries.iter().all(|e| e.timestamp >= cutoff));
    // 86 s spacing leaves 42 entries in the last 3600 s
    assert_eq!(view.len(), 42);
}

#[test]
fn keeps_original_order_and_borrows() {
    // Arrange
    let entries = vec![
        entry().at("2025-11-09T12:00:00Z").path("/b").build(),
        entry().at("2025-11-09T08:00:00Z").path("/old").build(),
        entry().at("2025-11-09T11:30:00Z").path("/a").build(),
    ];

    // Act
    let view = filter_window(&entries, ts("2025-11-09T12:00:00Z"), 1.0).unwrap();

    // Assert
    let paths: Vec<&str> = view.entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/b", "/a"]);
    assert!(std::ptr::eq(view.entries[0], &entries[0]));
}

#[test]
fn boundary_is_inclusive_and_future_entries_are_kept() {
    // Arrange
    let entries = vec![
        entry().at("2025-11-09T11:00:00Z").build(),
        entry().at("2025-11-09T10:59:59Z").build(),
        entry().at("2025-11-09T13:00:00Z").build(),
    ];

    // Act
    let view = filter_window(&entries, ts("2025-11-09T12:00:00Z"), 1.0).unwrap();

    // Assert
    let kept: Vec<_> = view.entries.iter().map(|e| e.timestamp).collect();
    assert_eq!(
        kept,
        vec![ts("2025-11-09T11:00:00Z"), ts("2025-11-09T13:00:00Z")]
    );
}

#[test]
fn fractional_hours_are_supported() {
    // Arrange
    let entries = vec![
        entry().at("2025-11-09T11:45:00Z").build(),
        entry().at("2025-11-09T11:44:59Z").build(),
    ];

    // Act
    let view = filter_window(&entries, ts("2025-11-09T12:00:00Z"), 0.25).unwrap();

    // Assert
    assert_eq!(view.len(), 1);
    let bounds = view.bounds.unwrap();
    assert_eq!(bounds.cutoff, ts("2025-11-09T11:45:00Z"));
}

#[test]
fn wider_window_never_keeps_fewer_entries() {
    // Arrange
    let entries = uniform_day(240, "2025-11-09T23:59:00Z");
    let now = ts("2025-11-09T23:59:00Z");

    // Act
    let sizes: Vec<usize> = [0.5, 1.0, 2.0, 6.0, 12.0, 24.0, 48.0]
        .into_iter()
        .map(|h| filter_window(&entries, now, h).unwrap().len())
        .collect();

    // Assert
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "sizes: {sizes:?}");
    assert_eq!(*sizes.last().unwrap(), entries.len());
}

#[test]
fn invalid_hours_are_rejected() {
    // Arrange
    let entries = vec![entry().build()];
    let now = ts("2025-11-09T12:00:00Z");

    // Act / Assert
    for bad in [0.0, -2.0, f64::NAN] {
        let result = filter_window(&entries, now, bad);
        assert!(matches!(result, Err(ConfigError::InvalidHours { .. })));
    }
}

#[test]
fn unfiltered_view_has_no_bounds() {
    // Arrange
    let entries = vec![entry().build(), entry().build()];

    // Act
    let view = WindowView::all(&entries);

    // Assert
    assert_eq!(view.len(), 2);
    assert!(view.bounds.is_none());
}
