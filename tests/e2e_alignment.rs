//! End-to-end tests for claim alignment and diagnostics.
//!
//! Analyze first, then hand synthesized claims to `GeometryEngine::align`.

use pretty_assertions::assert_eq;
use substrate_rs::model::ObservationKind;
use substrate_rs::{ClaimRecord, EmbeddingSet, GeometryConfig, GeometryEngine, GeometryReport, ParagraphRecord, Tier};

// ============================================================================
// Helper: three peaks (one per topic, three models each) plus a loner.
// Statement vectors reuse their paragraph's direction.
// ============================================================================

fn direction(topic: usize, model: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; 8];
    v[topic] = 1.0;
    v[4 + model] = 0.1;
    v
}

fn setup() -> (GeometryEngine, GeometryReport, EmbeddingSet) {
    let mut paragraphs = Vec::new();
    let mut paragraph_vectors = EmbeddingSet::new("test");
    let mut statement_vectors = EmbeddingSet::new("test");
    let mut add = |topic: usize, model: usize| {
        let id = format!("t{topic}_m{model}");
        let statement = format!("s_{id}");
        paragraphs.push(ParagraphRecord::new(id.clone(), model).with_statements([statement.clone()]));
        paragraph_vectors.insert(id, direction(topic, model));
        statement_vectors.insert(statement, direction(topic, model));
    };
    for topic in 0..3 {
        for model in 0..3 {
            add(topic, model);
        }
    }
    add(3, 3);

    let engine = GeometryEngine::new(GeometryConfig::default().with_k(2)).unwrap();
    let report = engine.analyze(&paragraphs, &paragraph_vectors);
    (engine, report, statement_vectors)
}

// ============================================================================
// 1. Coverage
// ============================================================================

#[test]
fn test_topic_claims_cover_their_regions() {
    let (engine, report, statements) = setup();
    let claims = vec![
        ClaimRecord::new("c0", ["s_t0_m0", "s_t0_m1"]).with_label("topic zero"),
        ClaimRecord::new("c1", ["s_t1_m2"]),
        ClaimRecord::new("c2", ["s_t2_m0", "s_t2_m1", "s_t2_m2"]),
    ];
    let (alignment, diagnostics) = engine.align(&report, &claims, &statements);

    let ratios: Vec<f64> = alignment.region_coverage.iter().map(|c| c.coverage_ratio).collect();
    assert_eq!(ratios, vec![1.0, 1.0, 1.0, 0.0]);
    assert!((alignment.global_coverage - 0.9).abs() < 1e-9);
    assert!(alignment.split_alerts.is_empty());
    assert!(alignment.merge_alerts.is_empty());
    assert!(alignment.unembedded_claims.is_empty());
    assert!(diagnostics.observations.is_empty());
    assert_eq!(diagnostics.peak_count, 3);
}

#[test]
fn test_uncovered_peak_is_observed() {
    let (engine, report, statements) = setup();
    let claims = vec![
        ClaimRecord::new("c0", ["s_t0_m0"]),
        ClaimRecord::new("c1", ["s_t1_m0"]),
        ClaimRecord::new("c3", ["s_t3_m3"]),
    ];
    let (alignment, diagnostics) = engine.align(&report, &claims, &statements);

    let r2 = alignment.region_coverage.iter().find(|c| c.region_id == "r_2").unwrap();
    assert_eq!(r2.covered_count, 0);
    assert_eq!(report.profile("r_2").unwrap().tier, Tier::Peak);

    let uncovered: Vec<&str> = diagnostics
        .observations
        .iter()
        .filter(|o| o.kind == ObservationKind::UncoveredHighTier)
        .filter_map(|o| o.region_id.as_deref())
        .collect();
    assert_eq!(uncovered, vec!["r_2"]);
}

// ============================================================================
// 2. Alerts
// ============================================================================

#[test]
fn test_claim_spanning_topics_is_split() {
    let (engine, report, statements) = setup();
    let claims = vec![ClaimRecord::new("wide", ["s_t0_m0", "s_t2_m1"])];
    let (alignment, _) = engine.align(&report, &claims, &statements);
    assert_eq!(alignment.split_alerts.len(), 1);
    assert_eq!(alignment.split_alerts[0].region_ids, vec!["r_0", "r_2"]);
    assert!(alignment.split_alerts[0].max_centroid_distance > 0.85);
}

#[test]
fn test_restated_claims_merge() {
    let (engine, report, statements) = setup();
    let claims = vec![
        ClaimRecord::new("first", ["s_t1_m0", "s_t1_m1"]),
        ClaimRecord::new("second", ["s_t1_m1", "s_t1_m2"]),
        ClaimRecord::new("ghost", ["s_nowhere"]),
    ];
    let (alignment, _) = engine.align(&report, &claims, &statements);
    assert_eq!(alignment.merge_alerts.len(), 1);
    assert_eq!(alignment.merge_alerts[0].claim_a, "first");
    assert_eq!(alignment.merge_alerts[0].claim_b, "second");
    assert_eq!(alignment.unembedded_claims, vec!["ghost"]);
}

#[test]
fn test_alignment_leaves_report_untouched() {
    let (engine, report, statements) = setup();
    let before = report.clone();
    let claims = vec![ClaimRecord::new("c", ["s_t0_m0"])];
    let _ = engine.align(&report, &claims, &statements);
    assert_eq!(report, before);
}
