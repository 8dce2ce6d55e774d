use crate::conf::{AnalysisConfig, ConfigError, Granularity, load_config, parse_config};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn bundled_agent_table_parses() {
    // Act
    let config = AnalysisConfig::default();

    // Assert
    let names: Vec<&str> = config
        .agent_categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["bot", "library", "browser"]);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_file_yields_defaults() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("analysis.hcl");
    fs::write(&path, "").unwrap();

    // Act
    let config = load_config(&path).unwrap();

    // Assert
    assert_eq!(config, AnalysisConfig::default());
}

#[test]
fn overrides_individual_fields() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("analysis.hcl");
    fs::write(
        &path,
        r#"
top_n               = 3
spike_granularity   = "hour"
spike_threshold_pct = 50
size_percentiles    = [90, 99.9]
parallel            = false
"#,
    )
    .unwrap();

    // Act
    let config = load_config(&path).unwrap();

    // Assert
    assert_eq!(config.top_n, 3);
    assert_eq!(config.spike_granularity, Granularity::Hour);
    assert_eq!(config.spike_threshold_pct, 50.0);
    assert_eq!(config.size_percentiles, vec![90.0, 99.9]);
    assert!(!config.parallel);
    assert_eq!(config.miss_cluster_window, 20);
}

#[test]
fn agent_table_can_be_replaced() {
    // Arrange
    let src = r#"
fallback_category = "other"
agent_categories = [
  { name = "internal", keywords = ["acme-probe"] },
]
"#;

    // Act
    let config = parse_config(src, Path::new("inline.hcl")).unwrap();

    // Assert
    assert_eq!(config.fallback_category, "other");
    assert_eq!(config.agent_categories.len(), 1);
    assert_eq!(config.agent_categories[0].name, "internal");
}

#[test]
fn unknown_field_is_a_parse_error() {
    // Arrange
    let src = "top_m = 3\n";

    // Act
    let err = parse_config(src, Path::new("typo.hcl")).unwrap_err();

    // Assert
    assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
}

#[test]
fn invalid_values_fail_after_parsing() {
    // Arrange
    let src = "top_n = 0\n";

    // Act
    let err = parse_config(src, Path::new("zero.hcl")).unwrap_err();

    // Assert
    assert!(matches!(err, ConfigError::InvalidTopN), "got {err:?}");
}

#[test]
fn missing_file_is_a_read_error() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.hcl");

    // Act
    let err = load_config(&path).unwrap_err();

    // Assert
    match err {
        ConfigError::ReadFile { path: p, .. } => assert_eq!(p, path),
        other => panic!("Expected ReadFile, got {other:?}"),
    }
}
