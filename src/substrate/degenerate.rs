//! Degenerate substrates.
//!
//! Same type as a normal substrate, fully structured: every paragraph is a
//! node, every node is its own component, the isolation ratio is 1 and all
//! three graphs are empty. Callers branch on `meta.degenerate`, never on an
//! error.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::MetaDraft;
use crate::config::GeometryConfig;
use crate::model::*;
use crate::shape::classify_shape;
use crate::topology::compute_topology;

pub(crate) fn build_degenerate_substrate(
    records: &[&ParagraphRecord],
    reason: DegenerateReason,
    backend: &str,
    config: &GeometryConfig,
    built_at: DateTime<Utc>,
    started: Instant,
    mut warnings: Vec<String>,
) -> GeometricSubstrate {
    warn!(
        reason = reason.as_str(),
        paragraphs = records.len(),
        "building degenerate substrate"
    );
    warnings.push(format!("degenerate input: {reason}"));

    let nodes: Vec<NodeProfile> = records
        .iter()
        .map(|p| {
            NodeProfile::isolated(
                p.id.clone(),
                p.model_index,
                p.stance,
                p.contested,
                p.statement_ids.clone(),
            )
        })
        .collect();
    let ids: Vec<&str> = nodes.iter().map(|n| n.paragraph_id.as_str()).collect();

    let graphs = SubstrateGraphs {
        knn: SimilarityGraph::empty(GraphKind::Knn, ids.iter().copied()),
        mutual: SimilarityGraph::empty(GraphKind::Mutual, ids.iter().copied()),
        strong: SimilarityGraph::empty(GraphKind::Strong, ids.iter().copied()),
    };

    let mut topology = compute_topology(ids.iter().copied(), &graphs.strong);
    topology.isolation_ratio = 1.0;
    let shape = classify_shape(&topology, nodes.len());

    let meta = MetaDraft {
        backend,
        k: config.knn.k,
        soft_threshold: config.threshold.clamp_min,
        similarity_stats: SimilarityStats::default(),
        node_count: nodes.len(),
        built_at,
        started,
        degenerate_reason: Some(reason),
        warnings,
    }
    .finish();

    GeometricSubstrate {
        nodes,
        graphs,
        topology,
        shape,
        meta,
    }
}
