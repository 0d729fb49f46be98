//! # Substrate Assembler
//!
//! Runs the similarity, threshold, topology and shape stages over one input
//! snapshot and emits a single immutable [`GeometricSubstrate`].
//!
//! ## Degeneracy checks (in order, each short-circuits)
//!
//! | Check | Reason |
//! |-------|--------|
//! | fewer than `min_paragraphs` nodes | `insufficient_paragraphs` |
//! | no usable embeddings / no computable pair | `embedding_failure` |
//! | every pairwise similarity identical | `collapsed_similarity` |
//!
//! Suspicious but usable distributions produce warnings in
//! `meta.warnings`, never errors.

pub(crate) mod degenerate;

use std::time::Instant;

use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use tracing::{debug, info, warn};

use crate::config::{GeometryConfig, QUANTIZATION, TIE_BREAK_RULE};
use crate::model::*;
use crate::shape::classify_shape;
use crate::similarity::knn::{build_knn_graph, build_mutual_graph, top_k_neighbors};
use crate::similarity::threshold::{build_strong_graph, compute_similarity_stats, compute_soft_threshold};
use crate::similarity::{quantize, SimilarityMatrix};
use crate::topology::compute_topology;

pub(crate) use degenerate::build_degenerate_substrate;

/// Build the geometric substrate for one snapshot.
///
/// Never fails: pathological input produces a degenerate substrate.
/// `config` is assumed validated (see [`GeometryConfig::validate`]).
pub fn build_geometric_substrate(
    paragraphs: &[ParagraphRecord],
    embeddings: &EmbeddingSet,
    config: &GeometryConfig,
) -> GeometricSubstrate {
    let started = Instant::now();
    let built_at = Utc::now();
    let mut warnings = Vec::new();

    // --- dedupe: first occurrence of an ID wins ---
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records: Vec<&ParagraphRecord> = Vec::with_capacity(paragraphs.len());
    for p in paragraphs {
        if seen.insert(p.id.as_str()) {
            records.push(p);
        } else {
            warnings.push(format!("duplicate paragraph id '{}' ignored", p.id));
        }
    }

    let degenerate = |reason: DegenerateReason, warnings: Vec<String>| {
        build_degenerate_substrate(
            &records,
            reason,
            &embeddings.backend,
            config,
            built_at,
            started,
            warnings,
        )
    };

    // --- 1. node count ---
    if records.len() < config.min_paragraphs {
        return degenerate(DegenerateReason::InsufficientParagraphs, warnings);
    }

    // --- 2. embeddings present ---
    let missing: Vec<&str> = records
        .iter()
        .filter(|p| embeddings.get(&p.id).is_none())
        .map(|p| p.id.as_str())
        .collect();
    if embeddings.is_empty() || missing.len() == records.len() {
        return degenerate(DegenerateReason::EmbeddingFailure, warnings);
    }
    if !missing.is_empty() {
        warnings.push(format!(
            "{} paragraph(s) without embedding treated as isolated: {}",
            missing.len(),
            missing.join(", ")
        ));
    }

    let ids: Vec<String> = records.iter().map(|p| p.id.clone()).collect();
    let matrix = SimilarityMatrix::compute(&ids, embeddings);
    if matrix.dimension_mismatches() > 0 {
        warnings.push(format!(
            "{} pair(s) skipped for embedding dimension mismatch",
            matrix.dimension_mismatches()
        ));
    }
    if matrix.upper_triangle().next().is_none() {
        return degenerate(DegenerateReason::EmbeddingFailure, warnings);
    }

    // --- 3. collapsed distribution ---
    if matrix.is_collapsed() {
        return degenerate(DegenerateReason::CollapsedSimilarity, warnings);
    }

    // --- graphs ---
    let neighbors = top_k_neighbors(&matrix, config.knn.k);
    let knn = build_knn_graph(&matrix, &neighbors);
    let mutual = build_mutual_graph(&matrix, &neighbors);

    let top1: Vec<f64> = neighbors
        .iter()
        .map(|list| list.first().map_or(0.0, |n| n.similarity))
        .collect();
    let soft_threshold = compute_soft_threshold(&top1, &config.threshold);
    let strong = build_strong_graph(&mutual, soft_threshold);

    let all_top_k: Vec<f64> = neighbors
        .iter()
        .flat_map(|list| list.iter().map(|n| n.similarity))
        .collect();
    let stats = compute_similarity_stats(&all_top_k);
    regime_warnings(&stats, soft_threshold, config, &mut warnings);

    // --- topology + shape over the strong backbone ---
    let topology = compute_topology(ids.iter().map(String::as_str), &strong);
    let shape = classify_shape(&topology, ids.len());

    // --- node stats ---
    let nodes: Vec<NodeProfile> = records
        .iter()
        .zip(neighbors)
        .zip(top1.iter())
        .map(|((p, top_k), &top1_sim)| {
            let avg_top_k_sim = if top_k.is_empty() {
                0.0
            } else {
                quantize(top_k.iter().map(|n| n.similarity).sum::<f64>() / top_k.len() as f64)
            };
            let mut patch: Vec<String> = mutual.neighbors(&p.id).to_vec();
            patch.push(p.id.clone());
            patch.sort();
            NodeProfile {
                paragraph_id: p.id.clone(),
                model_index: p.model_index,
                stance: p.stance,
                contested: p.contested,
                statement_ids: p.statement_ids.clone(),
                top1_sim,
                avg_top_k_sim,
                knn_degree: knn.degree(&p.id),
                mutual_degree: mutual.degree(&p.id),
                strong_degree: strong.degree(&p.id),
                isolation_score: quantize(1.0 - top1_sim),
                mutual_neighborhood_patch: patch,
                top_k,
            }
        })
        .collect();

    for w in &warnings {
        warn!(warning = %w, "substrate warning");
    }

    let meta = MetaDraft {
        backend: &embeddings.backend,
        k: config.knn.k,
        soft_threshold,
        similarity_stats: stats,
        node_count: nodes.len(),
        built_at,
        started,
        degenerate_reason: None,
        warnings,
    }
    .finish();

    info!(
        nodes = nodes.len(),
        knn_edges = knn.edge_count(),
        mutual_edges = mutual.edge_count(),
        strong_edges = strong.edge_count(),
        components = topology.component_count,
        soft_threshold,
        build_ms = meta.build_time_ms,
        "geometric substrate built"
    );

    GeometricSubstrate {
        nodes,
        graphs: SubstrateGraphs { knn, mutual, strong },
        topology,
        shape,
        meta,
    }
}

fn regime_warnings(
    stats: &SimilarityStats,
    soft_threshold: f64,
    config: &GeometryConfig,
    warnings: &mut Vec<String>,
) {
    if stats.count == 0 {
        return;
    }
    if stats.max < config.threshold.clamp_min {
        warnings.push(format!(
            "no similarity reaches the lower clamp bound (max {:.3} < {:.3})",
            stats.max, config.threshold.clamp_min
        ));
    }
    if stats.p95 < soft_threshold {
        warnings.push(format!(
            "sparse regime: p95 similarity {:.3} below soft threshold {:.3}",
            stats.p95, soft_threshold
        ));
    }
    if stats.p50 > config.threshold.clamp_max {
        warnings.push(format!(
            "dense regime: median similarity {:.3} above upper clamp bound {:.3}",
            stats.p50, config.threshold.clamp_max
        ));
    }
    debug!(
        max = stats.max,
        p95 = stats.p95,
        p80 = stats.p80,
        p50 = stats.p50,
        mean = stats.mean,
        "similarity distribution"
    );
}

/// Fields shared by normal and degenerate metadata.
pub(crate) struct MetaDraft<'a> {
    pub backend: &'a str,
    pub k: usize,
    pub soft_threshold: f64,
    pub similarity_stats: SimilarityStats,
    pub node_count: usize,
    pub built_at: DateTime<Utc>,
    pub started: Instant,
    pub degenerate_reason: Option<DegenerateReason>,
    pub warnings: Vec<String>,
}

impl MetaDraft<'_> {
    pub fn finish(self) -> SubstrateMeta {
        SubstrateMeta {
            quantization: QUANTIZATION,
            tie_break: TIE_BREAK_RULE.to_string(),
            embedding_backend: self.backend.to_string(),
            k: self.k,
            soft_threshold: self.soft_threshold,
            similarity_stats: self.similarity_stats,
            node_count: self.node_count,
            built_at: self.built_at,
            build_time_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            degenerate: self.degenerate_reason.is_some(),
            degenerate_reason: self.degenerate_reason,
            warnings: self.warnings,
        }
    }
}
