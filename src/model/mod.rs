//! # Substrate Model
//!
//! Plain DTOs that cross every stage boundary:
//! input snapshot → substrate → regions → profiles → gate → ordering → alignment.
//!
//! Design rule: no algorithms here, no I/O, no interior mutability.
//! Everything serializes to JSON without cycles; keyed collections are
//! `BTreeMap` so the wire form is deterministic.

pub mod paragraph;
pub mod node;
pub mod edge;
pub mod topology;
pub mod substrate;
pub mod region;
pub mod gate;
pub mod ordering;
pub mod claim;
pub mod report;

pub use paragraph::{ParagraphRecord, EmbeddingSet, Stance};
pub use node::{NodeProfile, Neighbor, NeighborList};
pub use edge::{Edge, GraphKind, SimilarityGraph};
pub use topology::{Component, TopologyMetrics, ShapeClassification};
pub use substrate::{
    GeometricSubstrate, SubstrateGraphs, SubstrateMeta,
    SimilarityStats, DegenerateReason,
};
pub use region::{
    Region, RegionKind, RegionProfile, RegionMass, RegionPurity,
    RegionGeometry, CarrierSource, Tier,
};
pub use gate::{GateVerdict, GateMeasurements, PipelineGateResult};
pub use ordering::{ModelOrderingResult, ModelScore, IrreplaceabilityBreakdown};
pub use claim::{
    ClaimRecord, RegionCoverage, SplitAlert, MergeAlert, AlignmentReport,
    Observation, ObservationKind, DiagnosticsReport,
};
pub use report::GeometryReport;
