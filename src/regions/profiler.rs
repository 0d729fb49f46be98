//! Region measurements: mass, purity, geometry, tier.
//!
//! Nearest-carrier similarity is taken from the first available source, in
//! this order:
//!
//! 1. embedding centroids (mean-pooled, renormalized member vectors)
//! 2. the pairwise field (members' top-k neighbor similarities)
//! 3. kNN graph edges leaving the region
//!
//! The order is fixed so results are deterministic; which source is more
//! authoritative is a tuning question, so the source used is recorded.

use hashbrown::HashMap;

use crate::config::{TierConfig, TierThresholds};
use crate::model::*;
use crate::similarity::{mean_pool, quantize, quantized_cosine};
use crate::topology::pair_density;

pub fn profile_regions(
    regions: &[Region],
    substrate: &GeometricSubstrate,
    embeddings: Option<&EmbeddingSet>,
    tiers: &TierConfig,
) -> Vec<RegionProfile> {
    let total_models = substrate.observed_models().len();
    let node_index: HashMap<&str, &NodeProfile> = substrate
        .nodes
        .iter()
        .map(|n| (n.paragraph_id.as_str(), n))
        .collect();
    let region_of: HashMap<&str, usize> = regions
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.node_ids.iter().map(move |id| (id.as_str(), i)))
        .collect();

    let centroids: Vec<Option<Vec<f32>>> = regions
        .iter()
        .map(|r| embeddings.and_then(|emb| mean_pool(r.node_ids.iter().filter_map(|id| emb.get(id)))))
        .collect();

    regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let members: Vec<&NodeProfile> = region
                .node_ids
                .iter()
                .filter_map(|id| node_index.get(id.as_str()).copied())
                .collect();

            let mass = measure_mass(region, total_models);
            let purity = measure_purity(&members);
            let carrier = nearest_carrier(i, regions, &centroids, &members, &region_of, substrate);
            let geometry = RegionGeometry {
                internal_density: internal_density(region, &substrate.graphs.mutual),
                avg_isolation: mean(members.iter().map(|n| n.isolation_score)),
                nearest_carrier_similarity: carrier.similarity,
                nearest_carrier_region: carrier.region.map(|j| regions[j].id.clone()),
                carrier_source: carrier.source,
            };
            let (tier, tier_confidence) = assign_tier(
                mass.model_diversity,
                geometry.internal_density,
                total_models,
                tiers,
            );
            RegionProfile {
                region_id: region.id.clone(),
                tier,
                tier_confidence,
                mass,
                purity,
                geometry,
            }
        })
        .collect()
}

// ============================================================================
// Mass + purity
// ============================================================================

fn measure_mass(region: &Region, total_models: usize) -> RegionMass {
    let model_diversity = region.model_indices.len();
    RegionMass {
        node_count: region.size(),
        model_diversity,
        model_diversity_ratio: if total_models == 0 {
            0.0
        } else {
            model_diversity as f64 / total_models as f64
        },
    }
}

fn measure_purity(members: &[&NodeProfile]) -> RegionPurity {
    let mut counts = vec![0usize; Stance::ALL.len()];
    for n in members {
        if let Some(slot) = Stance::ALL.iter().position(|s| *s == n.stance) {
            counts[slot] += 1;
        }
    }
    // first stance in declaration order wins a split vote
    let (dominant_slot, dominant_count) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |best, (slot, &c)| if c > best.1 { (slot, c) } else { best });
    let n = members.len();
    RegionPurity {
        dominant_stance: Stance::ALL[dominant_slot],
        stance_unanimity: if n == 0 { 0.0 } else { dominant_count as f64 / n as f64 },
        contested_ratio: if n == 0 {
            0.0
        } else {
            members.iter().filter(|m| m.contested).count() as f64 / n as f64
        },
        stance_variety: counts.iter().filter(|&&c| c > 0).count(),
    }
}

// ============================================================================
// Geometry
// ============================================================================

fn internal_density(region: &Region, graph: &SimilarityGraph) -> f64 {
    let internal = graph
        .edges
        .iter()
        .filter(|e| region.contains(&e.source) && region.contains(&e.target))
        .count();
    pair_density(internal, region.size())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { quantize(sum / count as f64) }
}

struct Carrier {
    similarity: f64,
    region: Option<usize>,
    source: CarrierSource,
}

fn best<I: Iterator<Item = (usize, f64)>>(candidates: I) -> Option<(usize, f64)> {
    // strict `>` keeps the earliest region on ties
    candidates.fold(None, |acc, (j, s)| match acc {
        Some((_, best)) if s <= best => acc,
        _ => Some((j, s)),
    })
}

fn nearest_carrier(
    i: usize,
    regions: &[Region],
    centroids: &[Option<Vec<f32>>],
    members: &[&NodeProfile],
    region_of: &HashMap<&str, usize>,
    substrate: &GeometricSubstrate,
) -> Carrier {
    // 1. centroids
    if let Some(own) = &centroids[i] {
        let found = best(centroids.iter().enumerate().filter(|(j, _)| *j != i).filter_map(|(j, c)| {
            c.as_ref().and_then(|c| quantized_cosine(own, c)).map(|s| (j, s))
        }));
        if let Some((j, similarity)) = found {
            return Carrier { similarity, region: Some(j), source: CarrierSource::EmbeddingCentroid };
        }
    }

    // 2. pairwise field
    let found = best(members.iter().flat_map(|m| m.top_k.iter()).filter_map(|n| {
        region_of
            .get(n.id.as_str())
            .filter(|&&j| j != i)
            .map(|&j| (j, n.similarity))
    }));
    if let Some((j, similarity)) = found {
        return Carrier { similarity, region: Some(j), source: CarrierSource::PairwiseField };
    }

    // 3. graph edges
    let region = &regions[i];
    let found = best(substrate.graphs.knn.edges.iter().filter_map(|e| {
        let other = match (region.contains(&e.source), region.contains(&e.target)) {
            (true, false) => &e.target,
            (false, true) => &e.source,
            _ => return None,
        };
        region_of.get(other.as_str()).map(|&j| (j, e.similarity))
    }));
    match found {
        Some((j, similarity)) => Carrier { similarity, region: Some(j), source: CarrierSource::GraphEdge },
        None => Carrier { similarity: 0.0, region: None, source: CarrierSource::None },
    }
}

// ============================================================================
// Tier
// ============================================================================

fn meets(t: &TierThresholds, diversity: usize, density: f64, total_models: usize) -> bool {
    diversity >= t.required_models(total_models) && density >= t.min_density
}

/// Relative surplus (positive) or shortfall (negative) against each minimum.
fn margins(t: &TierThresholds, diversity: usize, density: f64, total_models: usize) -> (f64, f64) {
    let req = t.required_models(total_models) as f64;
    let div = if req > 0.0 { (diversity as f64 - req) / req } else { 1.0 };
    let den = if t.min_density > 0.0 { (density - t.min_density) / t.min_density } else { 1.0 };
    (div, den)
}

/// Tier plus a continuous confidence in [0.5, 1].
pub fn assign_tier(diversity: usize, density: f64, total_models: usize, tiers: &TierConfig) -> (Tier, f64) {
    for (tier, t) in [(Tier::Peak, &tiers.peak), (Tier::Hill, &tiers.hill)] {
        if meets(t, diversity, density, total_models) {
            let (d, g) = margins(t, diversity, density, total_models);
            let confidence = 0.5 + 0.5 * d.min(g).clamp(0.0, 1.0);
            return (tier, quantize(confidence));
        }
    }
    let (d, g) = margins(&tiers.hill, diversity, density, total_models);
    let shortfall = (-d).max(-g).clamp(0.0, 1.0);
    (Tier::Floor, quantize(0.5 + 0.5 * shortfall))
}
