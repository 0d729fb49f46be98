//! Pipeline gate verdicts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    Proceed,
    SkipGeometry,
    TrivialConvergence,
    InsufficientStructure,
}

impl GateVerdict {
    /// Only a degenerate substrate withholds geometry from model ordering.
    pub fn allows_geometry(&self) -> bool {
        !matches!(self, GateVerdict::SkipGeometry)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateVerdict::Proceed => "proceed",
            GateVerdict::SkipGeometry => "skip_geometry",
            GateVerdict::TrivialConvergence => "trivial_convergence",
            GateVerdict::InsufficientStructure => "insufficient_structure",
        }
    }
}

impl std::fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw inputs to the gate decision list.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GateMeasurements {
    pub degenerate: bool,
    pub node_count: usize,
    pub largest_component_ratio: f64,
    pub largest_component_size: usize,
    pub largest_component_model_diversity_ratio: f64,
    pub isolation_ratio: f64,
    pub global_density: f64,
    pub component_count: usize,
    pub region_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineGateResult {
    pub verdict: GateVerdict,
    pub confidence: f64,
    /// Human-readable, for logs. Never parsed back.
    pub evidence: Vec<String>,
    pub measurements: GateMeasurements,
}
