use crate::conf::{AgentCategory, AnalysisConfig, ConfigError, validate_hours};

fn category(name: &str, keywords: &[&str]) -> AgentCategory {
    AgentCategory {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

#[test]
fn defaults_are_valid() {
    assert!(AnalysisConfig::default().validate().is_ok());
}

#[test]
fn zero_top_n_is_rejected() {
    // Arrange
    let config = AnalysisConfig {
        top_n: 0,
        ..AnalysisConfig::default()
    };

    // Act / Assert
    assert!(matches!(config.validate(), Err(ConfigError::InvalidTopN)));
}

#[test]
fn thresholds_are_range_checked() {
    let cases = [
        (
            AnalysisConfig {
                peak_stddev_factor: -1.0,
                ..AnalysisConfig::default()
            },
            "peak_stddev_factor",
        ),
        (
            AnalysisConfig {
                spike_threshold_pct: f64::NAN,
                ..AnalysisConfig::default()
            },
            "spike_threshold_pct",
        ),
        (
            AnalysisConfig {
                miss_cluster_window: 0,
                ..AnalysisConfig::default()
            },
            "miss_cluster_window",
        ),
        (
            AnalysisConfig {
                miss_cluster_density: 0.0,
                ..AnalysisConfig::default()
            },
            "miss_cluster_density",
        ),
        (
            AnalysisConfig {
                miss_cluster_density: 1.5,
                ..AnalysisConfig::default()
            },
            "miss_cluster_density",
        ),
        (
            AnalysisConfig {
                large_response_percentile: 101.0,
                ..AnalysisConfig::default()
            },
            "large_response_percentile",
        ),
        (
            AnalysisConfig {
                size_percentiles: vec![50.0, -5.0],
                ..AnalysisConfig::default()
            },
            "size_percentiles",
        ),
    ];

    for (config, expected) in cases {
        match config.validate() {
            Err(ConfigError::InvalidThreshold { field, .. }) => assert_eq!(field, expected),
            other => panic!("Expected InvalidThreshold({expected}), got {other:?}"),
        }
    }
}

#[test]
fn agent_table_problems_are_rejected() {
    let tables = [
        vec![category("", &["x"])],
        vec![category("a", &["x"]), category("a", &["y"])],
        vec![category("a", &[])],
        vec![category("a", &["  "])],
    ];

    for table in tables {
        let config = AnalysisConfig {
            agent_categories: table,
            ..AnalysisConfig::default()
        };
        assert!(
            matches!(config.validate(), Err(ConfigError::InvalidAgentTable { .. })),
            "table accepted: {:?}",
            config.agent_categories
        );
    }
}

#[test]
fn blank_fallback_category_is_rejected() {
    // Arrange
    let config = AnalysisConfig {
        fallback_category: " ".to_string(),
        ..AnalysisConfig::default()
    };

    // Act / Assert
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidAgentTable { .. })
    ));
}

#[test]
fn hours_must_be_positive_and_finite() {
    assert!(validate_hours(0.5).is_ok());
    assert!(validate_hours(24.0).is_ok());

    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(
            matches!(validate_hours(bad), Err(ConfigError::InvalidHours { .. })),
            "accepted {bad}"
        );
    }
}
