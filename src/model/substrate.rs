//! The geometric substrate and its provenance metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NodeProfile, ShapeClassification, SimilarityGraph, TopologyMetrics};

/// Why a substrate was built in degenerate form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateReason {
    /// Fewer paragraphs than `min_paragraphs`.
    InsufficientParagraphs,
    /// Embedding map empty, or no paragraph has a usable vector.
    EmbeddingFailure,
    /// Every computed pairwise similarity is identical.
    CollapsedSimilarity,
}

impl DegenerateReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegenerateReason::InsufficientParagraphs => "insufficient_paragraphs",
            DegenerateReason::EmbeddingFailure => "embedding_failure",
            DegenerateReason::CollapsedSimilarity => "collapsed_similarity",
        }
    }
}

impl std::fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution of top-k similarities. Diagnostics and gating only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimilarityStats {
    pub max: f64,
    pub p95: f64,
    pub p80: f64,
    pub p50: f64,
    pub mean: f64,
    pub count: usize,
}

/// The three graph variants built over the same node universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateGraphs {
    pub knn: SimilarityGraph,
    pub mutual: SimilarityGraph,
    pub strong: SimilarityGraph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateMeta {
    pub quantization: f64,
    pub tie_break: String,
    pub embedding_backend: String,
    pub k: usize,
    pub soft_threshold: f64,
    pub similarity_stats: SimilarityStats,
    pub node_count: usize,
    pub built_at: DateTime<Utc>,
    pub build_time_ms: f64,
    pub degenerate: bool,
    pub degenerate_reason: Option<DegenerateReason>,
    pub warnings: Vec<String>,
}

/// Immutable geometry over one input snapshot.
///
/// A degenerate substrate is the same type with `meta.degenerate` set:
/// singleton components, isolation ratio 1, empty graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricSubstrate {
    pub nodes: Vec<NodeProfile>,
    pub graphs: SubstrateGraphs,
    pub topology: TopologyMetrics,
    pub shape: ShapeClassification,
    pub meta: SubstrateMeta,
}

impl GeometricSubstrate {
    pub fn is_degenerate(&self) -> bool {
        self.meta.degenerate
    }

    pub fn node(&self, id: &str) -> Option<&NodeProfile> {
        self.nodes.iter().find(|n| n.paragraph_id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.paragraph_id.as_str())
    }

    /// Distinct model indices present in the substrate, ascending.
    pub fn observed_models(&self) -> Vec<usize> {
        let mut models: Vec<usize> = self.nodes.iter().map(|n| n.model_index).collect();
        models.sort_unstable();
        models.dedup();
        models
    }
}
