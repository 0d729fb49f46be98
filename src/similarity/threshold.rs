//! Adaptive soft threshold and the strong backbone graph.

use super::quantize;
use crate::config::{ThresholdConfig, ThresholdMethod};
use crate::model::{GraphKind, SimilarityGraph, SimilarityStats};

/// Value at percentile `p` of an ascending slice: index `floor(p · (n − 1))`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    let idx = (p * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Cutoff for the strong graph, derived from positive top-1 similarities.
///
/// Always within `[clamp_min, clamp_max]`; empty input yields `clamp_min`.
pub fn compute_soft_threshold(top1_sims: &[f64], config: &ThresholdConfig) -> f64 {
    let mut positive: Vec<f64> = top1_sims
        .iter()
        .copied()
        .filter(|s| s.is_finite() && *s > 0.0)
        .collect();
    if positive.is_empty() {
        return quantize(config.clamp_min).clamp(config.clamp_min, config.clamp_max);
    }
    positive.sort_by(f64::total_cmp);

    let raw = match config.method {
        ThresholdMethod::Percentile { p } => percentile(&positive, p),
        ThresholdMethod::Fixed { value } => value,
    };
    let clamped = raw.clamp(config.clamp_min, config.clamp_max);
    // quantizing a clamp bound can step outside it by < resolution
    quantize(clamped).clamp(config.clamp_min, config.clamp_max)
}

/// Mutual edges with similarity at or above `threshold`.
pub fn build_strong_graph(mutual: &SimilarityGraph, threshold: f64) -> SimilarityGraph {
    let edges = mutual
        .edges
        .iter()
        .filter(|e| e.similarity >= threshold)
        .cloned()
        .collect();
    SimilarityGraph::from_edges(
        GraphKind::Strong,
        mutual.adjacency.keys().map(String::as_str),
        edges,
    )
}

/// Distribution summary over every top-k similarity. Zeros on empty input.
pub fn compute_similarity_stats(top_k_sims: &[f64]) -> SimilarityStats {
    let mut sorted: Vec<f64> = top_k_sims.iter().copied().filter(|s| s.is_finite()).collect();
    if sorted.is_empty() {
        return SimilarityStats::default();
    }
    sorted.sort_by(f64::total_cmp);
    let sum: f64 = sorted.iter().sum();
    SimilarityStats {
        max: sorted[sorted.len() - 1],
        p95: percentile(&sorted, 0.95),
        p80: percentile(&sorted, 0.80),
        p50: percentile(&sorted, 0.50),
        mean: quantize(sum / sorted.len() as f64),
        count: sorted.len(),
    }
}
