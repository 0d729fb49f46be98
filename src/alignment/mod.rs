//! # Claim Alignment
//!
//! A read-only measurement pass run after an external synthesis step.
//! Claims are placed in the same embedding space as the statements they
//! cite and compared with the regions:
//!
//! - **coverage**: a statement is covered when its best-matching claim
//!   vector reaches `coverage_threshold`;
//! - **split**: one claim cites regions whose statement centroids are more
//!   than `split_threshold` apart (cosine distance);
//! - **merge**: two claim vectors are more similar than `merge_threshold`.
//!
//! Citations of unembedded statements are skipped. Nothing upstream is
//! modified.

pub mod diagnostics;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::AlignmentConfig;
use crate::model::*;
use crate::similarity::{mean_pool, quantized_cosine};

pub use diagnostics::diagnose;

pub fn align_claims(
    claims: &[ClaimRecord],
    regions: &[Region],
    statement_embeddings: &EmbeddingSet,
    config: &AlignmentConfig,
) -> AlignmentReport {
    // --- claim vectors ---
    let mut claim_vectors: Vec<(&ClaimRecord, Vec<f32>)> = Vec::new();
    let mut unembedded_claims = Vec::new();
    for claim in claims {
        let pooled = mean_pool(
            claim
                .source_statement_ids
                .iter()
                .filter_map(|s| statement_embeddings.get(s)),
        );
        match pooled {
            Some(v) => claim_vectors.push((claim, v)),
            None => unembedded_claims.push(claim.id.clone()),
        }
    }

    // --- coverage ---
    let mut region_coverage = Vec::with_capacity(regions.len());
    let (mut total_statements, mut total_covered) = (0usize, 0usize);
    for region in regions {
        let mut statement_count = 0usize;
        let mut covered_count = 0usize;
        for statement in &region.statement_ids {
            let Some(vector) = statement_embeddings.get(statement) else { continue };
            statement_count += 1;
            let best = claim_vectors
                .iter()
                .filter_map(|(_, cv)| quantized_cosine(vector, cv))
                .fold(f64::NEG_INFINITY, f64::max);
            if best >= config.coverage_threshold {
                covered_count += 1;
            }
        }
        let mut citing_claims: Vec<String> = claims
            .iter()
            .filter(|c| c.source_statement_ids.iter().any(|s| region.contains_statement(s)))
            .map(|c| c.id.clone())
            .collect();
        citing_claims.sort();
        citing_claims.dedup();

        total_statements += statement_count;
        total_covered += covered_count;
        region_coverage.push(RegionCoverage {
            region_id: region.id.clone(),
            statement_count,
            covered_count,
            coverage_ratio: ratio(covered_count, statement_count),
            citing_claims,
        });
    }

    let split_alerts = split_alerts(claims, regions, statement_embeddings, config);
    let merge_alerts = merge_alerts(&claim_vectors, config);

    debug!(
        claims = claims.len(),
        unembedded = unembedded_claims.len(),
        splits = split_alerts.len(),
        merges = merge_alerts.len(),
        "claims aligned"
    );

    AlignmentReport {
        region_coverage,
        global_coverage: ratio(total_covered, total_statements),
        split_alerts,
        merge_alerts,
        unembedded_claims,
    }
}

fn split_alerts(
    claims: &[ClaimRecord],
    regions: &[Region],
    statement_embeddings: &EmbeddingSet,
    config: &AlignmentConfig,
) -> Vec<SplitAlert> {
    let centroids: BTreeMap<&str, Vec<f32>> = regions
        .iter()
        .filter_map(|r| {
            mean_pool(r.statement_ids.iter().filter_map(|s| statement_embeddings.get(s)))
                .map(|c| (r.id.as_str(), c))
        })
        .collect();

    let mut alerts = Vec::new();
    for claim in claims {
        let mut spanned: Vec<&str> = claim
            .source_statement_ids
            .iter()
            .filter_map(|s| regions.iter().find(|r| r.contains_statement(s)))
            .map(|r| r.id.as_str())
            .collect();
        spanned.sort_unstable();
        spanned.dedup();
        if spanned.len() < 2 {
            continue;
        }

        let mut max_distance = 0.0f64;
        for (i, a) in spanned.iter().enumerate() {
            for b in &spanned[i + 1..] {
                let (Some(ca), Some(cb)) = (centroids.get(a), centroids.get(b)) else { continue };
                if let Some(sim) = quantized_cosine(ca, cb) {
                    max_distance = max_distance.max(1.0 - sim);
                }
            }
        }
        if max_distance > config.split_threshold {
            alerts.push(SplitAlert {
                claim_id: claim.id.clone(),
                region_ids: spanned.iter().map(|s| s.to_string()).collect(),
                max_centroid_distance: max_distance,
                message: format!(
                    "claim {} may be conflating {} regions that sit far apart (centroid distance {:.2})",
                    claim.id,
                    spanned.len(),
                    max_distance
                ),
            });
        }
    }
    alerts
}

fn merge_alerts(claim_vectors: &[(&ClaimRecord, Vec<f32>)], config: &AlignmentConfig) -> Vec<MergeAlert> {
    let mut alerts = Vec::new();
    for (i, (a, va)) in claim_vectors.iter().enumerate() {
        for (b, vb) in &claim_vectors[i + 1..] {
            let Some(similarity) = quantized_cosine(va, vb) else { continue };
            if similarity > config.merge_threshold {
                alerts.push(MergeAlert {
                    claim_a: a.id.clone(),
                    claim_b: b.id.clone(),
                    similarity,
                    message: format!(
                        "claims {} and {} may restate the same content (similarity {:.3})",
                        a.id, b.id, similarity
                    ),
                });
            }
        }
    }
    alerts
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}
