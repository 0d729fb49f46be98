//! Node in the geometric substrate.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use super::Stance;

/// One ranked neighbor from a node's top-k list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub similarity: f64,
    /// 1-indexed position in the owner's top-k list.
    pub rank: u32,
}

/// Top-k lists stay inline for the default k.
pub type NeighborList = SmallVec<[Neighbor; 8]>;

/// A paragraph placed in the substrate, with its neighborhood statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProfile {
    pub paragraph_id: String,
    pub model_index: usize,
    pub stance: Stance,
    pub contested: bool,
    pub statement_ids: Vec<String>,

    pub top1_sim: f64,
    pub avg_top_k_sim: f64,

    pub knn_degree: usize,
    pub mutual_degree: usize,
    pub strong_degree: usize,

    /// `1 - top1_sim`.
    pub isolation_score: f64,
    /// Self plus mutual neighbors, sorted.
    pub mutual_neighborhood_patch: Vec<String>,
    pub top_k: NeighborList,
}

impl NodeProfile {
    /// A node with no neighborhood at all (missing embedding, degenerate input).
    pub fn isolated(
        paragraph_id: impl Into<String>,
        model_index: usize,
        stance: Stance,
        contested: bool,
        statement_ids: Vec<String>,
    ) -> Self {
        let paragraph_id = paragraph_id.into();
        Self {
            mutual_neighborhood_patch: vec![paragraph_id.clone()],
            paragraph_id,
            model_index,
            stance,
            contested,
            statement_ids,
            top1_sim: 0.0,
            avg_top_k_sim: 0.0,
            knn_degree: 0,
            mutual_degree: 0,
            strong_degree: 0,
            isolation_score: 1.0,
            top_k: NeighborList::new(),
        }
    }
}
