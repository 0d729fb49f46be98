//! Model ordering results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IrreplaceabilityBreakdown {
    /// Regions where this model is the only carrier.
    pub sole_carrier_regions: usize,
    /// Irreplaceability earned in regions carried by few models.
    pub low_diversity_contribution: f64,
    pub total_region_nodes: usize,
    pub regions_touched: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model_index: usize,
    pub irreplaceability: f64,
    /// After optional relevance blending; equals `irreplaceability` otherwise.
    pub score: f64,
    pub breakdown: IrreplaceabilityBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOrderingResult {
    /// Placement order: strongest at the extremes, weakest in the middle.
    pub order: Vec<usize>,
    /// Ascending by model index.
    pub scores: Vec<ModelScore>,
    pub natural_order_fallback: bool,
    pub fallback_reason: Option<String>,
    pub relevance_blend: Option<f64>,
}
