//! # substrate-rs: Geometric Substrate over Multi-Model Embeddings
//!
//! Builds a deterministic geometric picture of a set of paragraphs written by
//! several models: who sits near whom, which groups hold together, how much
//! is isolated, and which model would be hardest to drop.
//!
//! ## Design Principles
//!
//! 1. **Data flows strictly downward**: substrate → regions → profiles → gate → ordering
//! 2. **Clean DTOs**: everything under [`model`] serializes to JSON without cycles
//! 3. **Degenerate is data**: pathological input yields a flagged substrate, never an `Err`
//! 4. **Deterministic**: similarities quantized to `1e-6`, every tie broken by ID
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use substrate_rs::{EmbeddingSet, GeometryConfig, GeometryEngine, ParagraphRecord};
//!
//! # fn example() -> substrate_rs::Result<()> {
//! let engine = GeometryEngine::new(GeometryConfig::default().with_k(3))?;
//!
//! let paragraphs = vec![
//!     ParagraphRecord::new("p0", 0).with_statements(["s0"]),
//!     ParagraphRecord::new("p1", 1).with_statements(["s1"]),
//!     ParagraphRecord::new("p2", 2).with_statements(["s2"]),
//! ];
//! let embeddings = EmbeddingSet::new("minilm")
//!     .with_vector("p0", vec![1.0, 0.0])
//!     .with_vector("p1", vec![0.9, 0.1])
//!     .with_vector("p2", vec![0.0, 1.0]);
//!
//! let report = engine.analyze(&paragraphs, &embeddings);
//! println!("gate: {}", report.gate.verdict);
//! println!("order: {:?}", report.ordering.order);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! | # | Stage | Module |
//! |---|-------|--------|
//! | 1 | kNN / mutual graphs | [`similarity::knn`] |
//! | 2 | Soft threshold, strong graph | [`similarity::threshold`] |
//! | 3 | Union-find topology | [`topology`] |
//! | 4 | Shape signals | [`shape`] |
//! | 5 | Substrate assembly | [`substrate`] |
//! | 6 | Regions | [`regions`] |
//! | 7 | Region profiles | [`regions::profiler`] |
//! | 8 | Pipeline gate | [`gate`] |
//! | 9 | Model ordering | [`ordering`] |
//! | 10 | Claim alignment | [`alignment`] |
//!
//! ## Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `parallel` | Similarity matrix rows on the rayon pool (bit-identical results) |

use std::collections::BTreeMap;

use tracing::info;

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod similarity;
pub mod topology;
pub mod shape;
pub mod substrate;
pub mod regions;
pub mod gate;
pub mod ordering;
pub mod alignment;
pub mod export;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    ParagraphRecord, EmbeddingSet, Stance, NodeProfile, Edge, SimilarityGraph,
    GeometricSubstrate, DegenerateReason, Region, RegionProfile, Tier,
    PipelineGateResult, GateVerdict, ModelOrderingResult, ClaimRecord,
    AlignmentReport, DiagnosticsReport, GeometryReport,
};

// ============================================================================
// Re-exports: Configuration and stage entry points
// ============================================================================

pub use config::{GeometryConfig, ThresholdMethod};
pub use substrate::build_geometric_substrate;
pub use regions::{build_regions, profile_regions};
pub use gate::evaluate_pipeline_gates;
pub use ordering::compute_model_ordering;
pub use alignment::{align_claims, diagnose};

// ============================================================================
// Top-level engine handle
// ============================================================================

/// The primary entry point. Owns a validated configuration and runs the
/// stages in order.
#[derive(Debug, Clone)]
pub struct GeometryEngine {
    config: GeometryConfig,
}

impl GeometryEngine {
    /// Validate the configuration and wrap it. The only fallible step.
    pub fn new(config: GeometryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Stages 1 through 5 only.
    pub fn build_substrate(&self, paragraphs: &[ParagraphRecord], embeddings: &EmbeddingSet) -> GeometricSubstrate {
        build_geometric_substrate(paragraphs, embeddings, &self.config)
    }

    /// Run stages 1 through 9 on one input snapshot.
    pub fn analyze(&self, paragraphs: &[ParagraphRecord], embeddings: &EmbeddingSet) -> GeometryReport {
        self.run(paragraphs, embeddings, None)
    }

    /// As [`analyze`](Self::analyze), blending an external per-model
    /// relevance boost into the ordering.
    pub fn analyze_with_relevance(
        &self,
        paragraphs: &[ParagraphRecord],
        embeddings: &EmbeddingSet,
        relevance: &BTreeMap<usize, f64>,
    ) -> GeometryReport {
        self.run(paragraphs, embeddings, Some(relevance))
    }

    fn run(
        &self,
        paragraphs: &[ParagraphRecord],
        embeddings: &EmbeddingSet,
        relevance: Option<&BTreeMap<usize, f64>>,
    ) -> GeometryReport {
        // Phase 1: Substrate
        let substrate = self.build_substrate(paragraphs, embeddings);

        // Phase 2: Regions
        let regions = build_regions(&substrate);
        let profiles = profile_regions(&regions, &substrate, Some(embeddings), &self.config.tiers);

        // Phase 3: Gate
        let gate = evaluate_pipeline_gates(&substrate, &regions, &self.config.gate);

        // Phase 4: Ordering
        let ordering = compute_model_ordering(&regions, &substrate, Some(&gate), relevance, &self.config.ordering);

        info!(
            nodes = substrate.nodes.len(),
            regions = regions.len(),
            verdict = gate.verdict.as_str(),
            degenerate = substrate.is_degenerate(),
            "geometry analysis complete"
        );
        GeometryReport { substrate, regions, profiles, gate, ordering }
    }

    /// Stage 10: compare synthesized claims with an analysis report.
    pub fn align(
        &self,
        report: &GeometryReport,
        claims: &[ClaimRecord],
        statement_embeddings: &EmbeddingSet,
    ) -> (AlignmentReport, DiagnosticsReport) {
        let alignment = align_claims(claims, &report.regions, statement_embeddings, &self.config.alignment);
        let diagnostics = diagnose(
            &alignment,
            &report.profiles,
            claims,
            &report.regions,
            &report.substrate.topology,
            &self.config.alignment,
        );
        (alignment, diagnostics)
    }
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self { config: GeometryConfig::default() }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Degenerate input is never an error; only configuration and I/O are.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
