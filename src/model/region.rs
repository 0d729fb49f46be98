//! Regions and their measured profiles.

use serde::{Deserialize, Serialize};
use super::Stance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    /// A connected component (size ≥ 2) of the strong backbone.
    Component,
    /// Nodes sharing an identical mutual-neighborhood signature.
    Patch,
}

/// A partition unit. Every substrate node belongs to exactly one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// `r_N`, assigned after sorting.
    pub id: String,
    pub kind: RegionKind,
    pub node_ids: Vec<String>,
    pub statement_ids: Vec<String>,
    pub model_indices: Vec<usize>,
    /// Component the region was lifted from, for component regions.
    pub source_component: Option<String>,
}

impl Region {
    pub fn size(&self) -> usize {
        self.node_ids.len()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_ids.binary_search_by(|n| n.as_str().cmp(node_id)).is_ok()
    }

    pub fn contains_statement(&self, statement_id: &str) -> bool {
        self.statement_ids.binary_search_by(|s| s.as_str().cmp(statement_id)).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Peak,
    Hill,
    Floor,
}

impl Tier {
    pub fn is_high(&self) -> bool {
        matches!(self, Tier::Peak | Tier::Hill)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Peak => write!(f, "peak"),
            Tier::Hill => write!(f, "hill"),
            Tier::Floor => write!(f, "floor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionMass {
    pub node_count: usize,
    pub model_diversity: usize,
    /// Against every model observed in the substrate.
    pub model_diversity_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionPurity {
    pub dominant_stance: Stance,
    pub stance_unanimity: f64,
    pub contested_ratio: f64,
    pub stance_variety: usize,
}

/// Where a nearest-carrier similarity came from, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierSource {
    EmbeddingCentroid,
    PairwiseField,
    GraphEdge,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGeometry {
    pub internal_density: f64,
    pub avg_isolation: f64,
    pub nearest_carrier_similarity: f64,
    pub nearest_carrier_region: Option<String>,
    pub carrier_source: CarrierSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    pub region_id: String,
    pub tier: Tier,
    pub tier_confidence: f64,
    pub mass: RegionMass,
    pub purity: RegionPurity,
    pub geometry: RegionGeometry,
}
