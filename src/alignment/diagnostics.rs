//! Hedged observations over an alignment report.
//!
//! Every message says what *may* be happening. The observations are for a
//! reader, never for another decision in the pipeline.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::AlignmentConfig;
use crate::model::*;

pub fn diagnose(
    alignment: &AlignmentReport,
    profiles: &[RegionProfile],
    claims: &[ClaimRecord],
    regions: &[Region],
    topology: &TopologyMetrics,
    config: &AlignmentConfig,
) -> DiagnosticsReport {
    let coverage: BTreeMap<&str, &RegionCoverage> = alignment
        .region_coverage
        .iter()
        .map(|c| (c.region_id.as_str(), c))
        .collect();
    let mut observations = Vec::new();

    for profile in profiles {
        let Some(cov) = coverage.get(profile.region_id.as_str()) else { continue };
        match profile.tier {
            tier if tier.is_high() => {
                if cov.statement_count > 0 && cov.coverage_ratio < config.coverage_threshold {
                    observations.push(Observation {
                        kind: ObservationKind::UncoveredHighTier,
                        region_id: Some(profile.region_id.clone()),
                        claim_ids: cov.citing_claims.clone(),
                        message: format!(
                            "{} region {} may be under-represented: {:.0}% of its statements are matched by a claim",
                            profile.tier,
                            profile.region_id,
                            cov.coverage_ratio * 100.0
                        ),
                    });
                }
            }
            _ => {
                if cov.citing_claims.len() >= config.overclaim_min_claims {
                    observations.push(Observation {
                        kind: ObservationKind::OverclaimedFloor,
                        region_id: Some(profile.region_id.clone()),
                        claim_ids: cov.citing_claims.clone(),
                        message: format!(
                            "floor region {} is cited by {} claims; the synthesis may be leaning on thin evidence",
                            profile.region_id,
                            cov.citing_claims.len()
                        ),
                    });
                }
            }
        }
    }

    let peak_count = profiles.iter().filter(|p| p.tier == Tier::Peak).count();
    if claims.len() < peak_count {
        observations.push(Observation {
            kind: ObservationKind::ClaimCountBelowPeaks,
            region_id: None,
            claim_ids: Vec::new(),
            message: format!(
                "{} claim(s) for {} peak region(s); some peaks may not be addressed",
                claims.len(),
                peak_count
            ),
        });
    }
    if claims.len() > 2 * regions.len() {
        observations.push(Observation {
            kind: ObservationKind::ClaimCountAboveRegions,
            region_id: None,
            claim_ids: Vec::new(),
            message: format!(
                "{} claim(s) over {} region(s) in {} component(s); claims may be fragmenting shared content",
                claims.len(),
                regions.len(),
                topology.component_count
            ),
        });
    }

    debug!(observations = observations.len(), peaks = peak_count, "alignment diagnosed");
    DiagnosticsReport {
        observations,
        claim_count: claims.len(),
        region_count: regions.len(),
        peak_count,
    }
}

#[cfg(test)]
mod tests {
    use super::super::align_claims;
    use super::super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile(region_id: &str, tier: Tier) -> RegionProfile {
        RegionProfile {
            region_id: region_id.to_string(),
            tier,
            tier_confidence: 0.5,
            mass: RegionMass { node_count: 1, model_diversity: 1, model_diversity_ratio: 1.0 },
            purity: RegionPurity {
                dominant_stance: Stance::default(),
                stance_unanimity: 1.0,
                contested_ratio: 0.0,
                stance_variety: 1,
            },
            geometry: RegionGeometry {
                internal_density: 0.0,
                avg_isolation: 0.0,
                nearest_carrier_similarity: 0.0,
                nearest_carrier_region: None,
                carrier_source: CarrierSource::None,
            },
        }
    }

    #[test]
    fn flags_uncovered_peak_and_overclaimed_floor() {
        let regions = regions();
        let claims = claims();
        let alignment = align_claims(&claims, &regions, &statements(), &AlignmentConfig::default());
        let profiles = vec![
            profile("r_0", Tier::Floor),
            profile("r_1", Tier::Hill),
            profile("r_2", Tier::Floor),
            profile("r_3", Tier::Peak),
        ];
        let report = diagnose(
            &alignment,
            &profiles,
            &claims,
            &regions,
            &TopologyMetrics::default(),
            &AlignmentConfig::default(),
        );
        let kinds: Vec<ObservationKind> = report.observations.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec![ObservationKind::OverclaimedFloor, ObservationKind::UncoveredHighTier]);
        assert_eq!(report.observations[0].region_id.as_deref(), Some("r_0"));
        assert_eq!(report.observations[0].claim_ids, vec!["c1", "c3"]);
        assert_eq!(report.observations[1].region_id.as_deref(), Some("r_3"));
        assert!(report.observations.iter().all(|o| o.message.contains("may")));
        assert_eq!(report.peak_count, 1);
    }

    #[test]
    fn claim_count_mismatches() {
        let regions = vec![region("r_0", &["s1"])];
        let profiles = vec![profile("r_0", Tier::Peak)];
        let topology = TopologyMetrics::default();
        let config = AlignmentConfig::default();

        let empty = align_claims(&[], &regions, &statements(), &config);
        let report = diagnose(&empty, &profiles, &[], &regions, &topology, &config);
        assert!(report.observations.iter().any(|o| o.kind == ObservationKind::ClaimCountBelowPeaks));

        let many = vec![
            ClaimRecord::new("c1", ["s1"]),
            ClaimRecord::new("c2", ["s1"]),
            ClaimRecord::new("c3", ["s1"]),
        ];
        let aligned = align_claims(&many, &regions, &statements(), &config);
        let report = diagnose(&aligned, &profiles, &many, &regions, &topology, &config);
        assert!(report.observations.iter().any(|o| o.kind == ObservationKind::ClaimCountAboveRegions));
        assert_eq!(report.claim_count, 3);
    }
}
