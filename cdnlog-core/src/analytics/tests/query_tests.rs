use crate::analytics::{QuerySignature, RankedCount, query_patterns};
use crate::conf::AnalysisConfig;
use crate::test_helpers::{entry, refs};
use pretty_assertions::assert_eq;

#[test]
fn counts_parameters_values_and_signatures() {
    // Arrange
    let entries = vec![
        entry().path("/search").params(&[("q", "shoes"), ("page", "1")]).build(),
        entry().path("/search").params(&[("page", "2"), ("q", "shoes")]).build(),
        entry().path("/search").params(&[("q", "hats")]).build(),
        entry().path("/items").params(&[("id", "7")]).build(),
        entry().path("/plain").build(),
    ];

    // Act
    let q = query_patterns(&refs(&entries), &AnalysisConfig::default());

    // Assert
    assert_eq!(q.entries_with_query, 4);
    assert_eq!(
        q.parameter_frequency,
        vec![
            RankedCount::new("q", 3),
            RankedCount::new("page", 2),
            RankedCount::new("id", 1),
        ]
    );
    assert_eq!(
        q.parameter_values["q"],
        vec![RankedCount::new("shoes", 2), RankedCount::new("hats", 1)]
    );
    assert_eq!(
        q.parameter_values["page"],
        vec![RankedCount::new("1", 1), RankedCount::new("2", 1)]
    );
    assert_eq!(
        q.query_signatures,
        vec![
            QuerySignature {
                path: "/search".to_string(),
                parameters: vec!["page".to_string(), "q".to_string()],
                count: 2,
            },
            QuerySignature {
                path: "/items".to_string(),
                parameters: vec!["id".to_string()],
                count: 1,
            },
            QuerySignature {
                path: "/search".to_string(),
                parameters: vec!["q".to_string()],
                count: 1,
            },
        ]
    );
}

#[test]
fn values_are_truncated_to_top_n() {
    // Arrange
    let entries: Vec<_> = (0..20)
        .map(|i| {
            let id = i.to_string();
            entry().params(&[("id", id.as_str())]).build()
        })
        .collect();
    let config = AnalysisConfig {
        top_n: 5,
        ..AnalysisConfig::default()
    };

    // Act
    let q = query_patterns(&refs(&entries), &config);

    // Assert
    assert_eq!(q.parameter_values["id"].len(), 5);
    assert_eq!(q.parameter_frequency, vec![RankedCount::new("id", 20)]);
}

#[test]
fn entries_without_params_produce_nothing() {
    // Arrange
    let entries = vec![entry().build(), entry().build()];

    // Act
    let q = query_patterns(&refs(&entries), &AnalysisConfig::default());

    // Assert
    assert_eq!(q.entries_with_query, 0);
    assert!(q.parameter_frequency.is_empty());
    assert!(q.query_signatures.is_empty());
}
