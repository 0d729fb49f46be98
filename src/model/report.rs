//! The bundle one analysis run produces.

use serde::{Deserialize, Serialize};

use super::{GeometricSubstrate, ModelOrderingResult, PipelineGateResult, Region, RegionProfile};

/// Everything stages 1 through 9 produce for one input snapshot.
///
/// `profiles[i]` describes `regions[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryReport {
    pub substrate: GeometricSubstrate,
    pub regions: Vec<Region>,
    pub profiles: Vec<RegionProfile>,
    pub gate: PipelineGateResult,
    pub ordering: ModelOrderingResult,
}

impl GeometryReport {
    pub fn profile(&self, region_id: &str) -> Option<&RegionProfile> {
        self.profiles.iter().find(|p| p.region_id == region_id)
    }
}
