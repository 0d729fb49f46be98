//! # Model Ordering
//!
//! Scores each contributing model by geometric irreplaceability and lays the
//! models out outside-in.
//!
//! For every region holding nodes of model `m`:
//!
//! ```text
//! irreplaceability(m) += (m's nodes in r / |r|) * (1 / diversity(r))
//! ```
//!
//! A sole carrier of a sparse region earns full credit; consensus regions
//! shared by many models contribute almost nothing.
//!
//! An optional per-model relevance boost is blended in, scaled by the
//! population standard deviation of the boosts and capped at
//! `max_relevance_blend`. Uniform boosts leave irreplaceability alone.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::OrderingConfig;
use crate::model::*;

pub fn compute_model_ordering(
    regions: &[Region],
    substrate: &GeometricSubstrate,
    gate: Option<&PipelineGateResult>,
    relevance: Option<&BTreeMap<usize, f64>>,
    config: &OrderingConfig,
) -> ModelOrderingResult {
    let models = substrate.observed_models();
    let model_of: BTreeMap<&str, usize> = substrate
        .nodes
        .iter()
        .map(|n| (n.paragraph_id.as_str(), n.model_index))
        .collect();

    let mut scores: BTreeMap<usize, ModelScore> = models
        .iter()
        .map(|&m| {
            (
                m,
                ModelScore {
                    model_index: m,
                    irreplaceability: 0.0,
                    score: 0.0,
                    breakdown: IrreplaceabilityBreakdown::default(),
                },
            )
        })
        .collect();

    for region in regions {
        let diversity = region.model_indices.len();
        if diversity == 0 || region.node_ids.is_empty() {
            continue;
        }
        let mut per_model: BTreeMap<usize, usize> = BTreeMap::new();
        for id in &region.node_ids {
            if let Some(&m) = model_of.get(id.as_str()) {
                *per_model.entry(m).or_default() += 1;
            }
        }
        let size = region.node_ids.len() as f64;
        for (m, count) in per_model {
            let Some(entry) = scores.get_mut(&m) else { continue };
            let credit = (count as f64 / size) * (1.0 / diversity as f64);
            entry.irreplaceability += credit;
            entry.breakdown.total_region_nodes += count;
            entry.breakdown.regions_touched += 1;
            if diversity == 1 {
                entry.breakdown.sole_carrier_regions += 1;
            }
            if diversity <= config.low_diversity_max_models {
                entry.breakdown.low_diversity_contribution += credit;
            }
        }
    }

    let relevance_blend = relevance.map(|boosts| {
        let values: Vec<f64> = models.iter().map(|m| boost_for(boosts, *m)).collect();
        (population_std(&values) * config.relevance_blend_scale).min(config.max_relevance_blend)
    });
    for score in scores.values_mut() {
        score.score = match (relevance_blend, relevance) {
            (Some(blend), Some(boosts)) => {
                let boost = boost_for(boosts, score.model_index);
                score.irreplaceability * ((1.0 - blend) + blend * boost)
            }
            _ => score.irreplaceability,
        };
    }
    let scores: Vec<ModelScore> = scores.into_values().collect();

    let fallback_reason = if gate.is_some_and(|g| !g.verdict.allows_geometry()) {
        Some("skip_geometry gate verdict".to_string())
    } else if regions.is_empty() {
        Some("no regions".to_string())
    } else if all_equal(&scores, config.score_epsilon) {
        Some("all model scores equal".to_string())
    } else {
        None
    };

    let order = match &fallback_reason {
        Some(reason) => {
            info!(reason = reason.as_str(), models = models.len(), "model ordering fell back to natural order");
            models.clone()
        }
        None => {
            let ranked: Vec<(usize, f64)> = scores.iter().map(|s| (s.model_index, s.score)).collect();
            order_by_scores(&ranked)
        }
    };
    debug!(?order, blend = ?relevance_blend, "model ordering computed");

    ModelOrderingResult {
        order,
        scores,
        natural_order_fallback: fallback_reason.is_some(),
        fallback_reason,
        relevance_blend,
    }
}

/// Rank by score descending (ties by ascending model index), then place
/// outside-in.
pub fn order_by_scores(scores: &[(usize, f64)]) -> Vec<usize> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let ranked: Vec<usize> = ranked.into_iter().map(|(m, _)| m).collect();
    outside_in_order(&ranked)
}

/// Fill position 0, then the last, then 1, then second-to-last, ... from a
/// strongest-first ranking. The weakest ends up in the middle.
pub fn outside_in_order<T: Clone>(ranked: &[T]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = vec![None; ranked.len()];
    let (mut front, mut back) = (0usize, ranked.len());
    for (i, item) in ranked.iter().enumerate() {
        if i % 2 == 0 {
            slots[front] = Some(item.clone());
            front += 1;
        } else {
            back -= 1;
            slots[back] = Some(item.clone());
        }
    }
    slots.into_iter().flatten().collect()
}

/// Models absent from the boost map are neutral.
fn boost_for(boosts: &BTreeMap<usize, f64>, model: usize) -> f64 {
    boosts.get(&model).copied().filter(|b| b.is_finite()).unwrap_or(1.0)
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

fn all_equal(scores: &[ModelScore], epsilon: f64) -> bool {
    let Some(first) = scores.first() else { return true };
    scores.iter().all(|s| (s.score - first.score).abs() <= epsilon)
}
