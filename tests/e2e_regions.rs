//! End-to-end tests for regions and region profiles.
//!
//! Each test runs the full `GeometryEngine::analyze` pipeline and inspects
//! `report.regions` / `report.profiles`.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use substrate_rs::model::{CarrierSource, RegionKind};
use substrate_rs::{EmbeddingSet, GeometryConfig, GeometryEngine, GeometryReport, ParagraphRecord, Stance, Tier};

// ============================================================================
// Helpers
// ============================================================================

fn engine(k: usize) -> GeometryEngine {
    GeometryEngine::new(GeometryConfig::default().with_k(k)).unwrap()
}

/// A tight triangle (a, b, c) across three models and two loners.
fn triangle_plus_two() -> GeometryReport {
    let paragraphs = vec![
        ParagraphRecord::new("a", 0).with_stance(Stance::Prescriptive).with_statements(["s_a"]),
        ParagraphRecord::new("b", 1).with_stance(Stance::Prescriptive).with_statements(["s_b"]),
        ParagraphRecord::new("c", 2).with_stance(Stance::Cautionary).contested(true).with_statements(["s_c"]),
        ParagraphRecord::new("d", 0).with_statements(["s_d"]),
        ParagraphRecord::new("e", 1).with_statements(["s_e"]),
    ];
    let embeddings = EmbeddingSet::new("test")
        .with_vector("a", vec![1.0, 0.0, 0.0])
        .with_vector("b", vec![0.99, 0.141, 0.0])
        .with_vector("c", vec![0.99, 0.0, 0.141])
        .with_vector("d", vec![0.3, 0.954, 0.0])
        .with_vector("e", vec![0.3, 0.0, 0.954]);
    engine(2).analyze(&paragraphs, &embeddings)
}

// ============================================================================
// 1. Region scenario
// ============================================================================

#[test]
fn test_triangle_and_two_singletons() {
    let report = triangle_plus_two();
    let summary: Vec<(&str, RegionKind, usize)> = report
        .regions
        .iter()
        .map(|r| (r.id.as_str(), r.kind, r.size()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("r_0", RegionKind::Component, 3),
            ("r_1", RegionKind::Patch, 1),
            ("r_2", RegionKind::Patch, 1),
        ]
    );
    assert_ne!(
        report.substrate.node("d").unwrap().mutual_neighborhood_patch,
        report.substrate.node("e").unwrap().mutual_neighborhood_patch
    );
}

#[test]
fn test_regions_cover_every_node_once() {
    let report = triangle_plus_two();
    let mut seen = BTreeSet::new();
    for region in &report.regions {
        for id in &region.node_ids {
            assert!(seen.insert(id.as_str()), "{id} covered twice");
        }
    }
    let all: BTreeSet<&str> = report.substrate.node_ids().collect();
    assert_eq!(seen, all);
}

#[test]
fn test_degenerate_report_still_partitions() {
    let paragraphs = vec![ParagraphRecord::new("p0", 0), ParagraphRecord::new("p1", 1)];
    let report = engine(5).analyze(&paragraphs, &EmbeddingSet::new("test"));
    assert_eq!(report.regions.len(), 2);
    assert_eq!(report.profiles.len(), 2);
    assert!(report.profiles.iter().all(|p| p.tier == Tier::Floor));
}

// ============================================================================
// 2. Profiles
// ============================================================================

#[test]
fn test_profiles_align_with_regions() {
    let report = triangle_plus_two();
    let ids: Vec<&str> = report.profiles.iter().map(|p| p.region_id.as_str()).collect();
    assert_eq!(ids, vec!["r_0", "r_1", "r_2"]);
}

#[test]
fn test_triangle_is_peak() {
    let report = triangle_plus_two();
    let p = report.profile("r_0").unwrap();
    assert_eq!(p.tier, Tier::Peak);
    assert!(p.tier_confidence >= 0.5 && p.tier_confidence <= 1.0);
    assert_eq!(p.mass.node_count, 3);
    assert_eq!(p.mass.model_diversity, 3);
    assert_eq!(p.mass.model_diversity_ratio, 1.0);
    assert_eq!(p.geometry.internal_density, 1.0);
}

#[test]
fn test_triangle_purity() {
    let report = triangle_plus_two();
    let purity = report.profile("r_0").unwrap().purity;
    assert_eq!(purity.dominant_stance, Stance::Prescriptive);
    assert!((purity.stance_unanimity - 2.0 / 3.0).abs() < 1e-9);
    assert!((purity.contested_ratio - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(purity.stance_variety, 2);
}

#[test]
fn test_loners_are_floor_with_centroid_carrier() {
    let report = triangle_plus_two();
    for id in ["r_1", "r_2"] {
        let p = report.profile(id).unwrap();
        assert_eq!(p.tier, Tier::Floor);
        assert_eq!(p.geometry.internal_density, 0.0);
        assert_eq!(p.geometry.carrier_source, CarrierSource::EmbeddingCentroid);
        assert_eq!(p.geometry.nearest_carrier_region.as_deref(), Some("r_0"));
        assert!(p.geometry.nearest_carrier_similarity > 0.0);
    }
}
