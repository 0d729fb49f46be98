//! Claims from the external synthesis step, and what alignment observes
//! about them.

use serde::{Deserialize, Serialize};

/// A synthesized claim and the statements it cites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub source_statement_ids: Vec<String>,
}

impl ClaimRecord {
    pub fn new(id: impl Into<String>, sources: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            source_statement_ids: sources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCoverage {
    pub region_id: String,
    /// Statements in the region that have an embedding.
    pub statement_count: usize,
    pub covered_count: usize,
    pub coverage_ratio: f64,
    /// Claims citing at least one statement of this region, sorted.
    pub citing_claims: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitAlert {
    pub claim_id: String,
    pub region_ids: Vec<String>,
    pub max_centroid_distance: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeAlert {
    pub claim_a: String,
    pub claim_b: String,
    pub similarity: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub region_coverage: Vec<RegionCoverage>,
    pub global_coverage: f64,
    pub split_alerts: Vec<SplitAlert>,
    pub merge_alerts: Vec<MergeAlert>,
    /// Claims with no embedded source statement.
    pub unembedded_claims: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    UncoveredHighTier,
    OverclaimedFloor,
    ClaimCountBelowPeaks,
    ClaimCountAboveRegions,
}

/// A hedged, read-only observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub kind: ObservationKind,
    pub region_id: Option<String>,
    pub claim_ids: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub observations: Vec<Observation>,
    pub claim_count: usize,
    pub region_count: usize,
    pub peak_count: usize,
}
