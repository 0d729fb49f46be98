//! # Geometry Configuration
//!
//! A plain value object with named parameters and stated defaults. Nothing
//! here reads the environment; callers build one, optionally adjust it with
//! the `with_*` helpers, and hand it to [`GeometryEngine::new`], which
//! rejects invalid values up front.
//!
//! Gate and tier cutoffs are hand-tuned defaults and are expected to be
//! recalibrated.
//!
//! [`GeometryEngine::new`]: crate::GeometryEngine::new

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Resolution every similarity is rounded to before comparison.
pub const QUANTIZATION: f64 = 1e-6;

/// Tie-break rule recorded in substrate provenance.
pub const TIE_BREAK_RULE: &str = "lexicographic_id";

// ============================================================================
// Top-level configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub knn: KnnConfig,
    pub threshold: ThresholdConfig,
    /// Below this many paragraphs the substrate is degenerate.
    pub min_paragraphs: usize,
    pub gate: GateConfig,
    pub tiers: TierConfig,
    pub ordering: OrderingConfig,
    pub alignment: AlignmentConfig,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            knn: KnnConfig::default(),
            threshold: ThresholdConfig::default(),
            min_paragraphs: 3,
            gate: GateConfig::default(),
            tiers: TierConfig::default(),
            ordering: OrderingConfig::default(),
            alignment: AlignmentConfig::default(),
        }
    }
}

impl GeometryConfig {
    pub fn with_k(mut self, k: usize) -> Self {
        self.knn.k = k;
        self
    }

    pub fn with_threshold_method(mut self, method: ThresholdMethod) -> Self {
        self.threshold.method = method;
        self
    }

    pub fn with_clamp(mut self, min: f64, max: f64) -> Self {
        self.threshold.clamp_min = min;
        self.threshold.clamp_max = max;
        self
    }

    pub fn with_min_paragraphs(mut self, n: usize) -> Self {
        self.min_paragraphs = n;
        self
    }

    /// Reject values that can only come from a programming error.
    pub fn validate(&self) -> Result<()> {
        if self.knn.k == 0 {
            return Err(Error::InvalidConfig("knn.k must be at least 1".into()));
        }
        self.threshold.validate()?;
        self.gate.validate()?;
        self.tiers.validate()?;
        self.ordering.validate()?;
        self.alignment.validate()?;
        Ok(())
    }
}

// ============================================================================
// kNN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    pub k: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self { k: 5 }
    }
}

// ============================================================================
// Soft threshold
// ============================================================================

/// How the strong-graph cutoff is derived from top-1 similarities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Percentile `p` in [0, 1] of positive top-1 similarities.
    Percentile { p: f64 },
    /// A fixed cutoff (still clamped).
    Fixed { value: f64 },
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        ThresholdMethod::Percentile { p: 0.80 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub method: ThresholdMethod,
    pub clamp_min: f64,
    pub clamp_max: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            method: ThresholdMethod::default(),
            clamp_min: 0.55,
            clamp_max: 0.78,
        }
    }
}

impl ThresholdConfig {
    fn validate(&self) -> Result<()> {
        unit("threshold.clamp_min", self.clamp_min)?;
        unit("threshold.clamp_max", self.clamp_max)?;
        if self.clamp_min > self.clamp_max {
            return Err(Error::InvalidConfig(format!(
                "threshold.clamp_min ({}) exceeds threshold.clamp_max ({})",
                self.clamp_min, self.clamp_max
            )));
        }
        match self.method {
            ThresholdMethod::Percentile { p } => unit("threshold.method.p", p),
            ThresholdMethod::Fixed { value } => unit("threshold.method.value", value),
        }
    }
}

// ============================================================================
// Pipeline gate
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub convergence_component_ratio: f64,
    pub convergence_model_ratio: f64,
    pub convergence_max_isolation: f64,
    pub insufficient_min_isolation: f64,
    /// Largest component at or below this size counts as "no structure".
    pub insufficient_max_component: usize,
    /// Global density treated as fully dense when scoring `proceed`.
    pub density_reference: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            convergence_component_ratio: 0.85,
            convergence_model_ratio: 0.8,
            convergence_max_isolation: 0.1,
            insufficient_min_isolation: 0.7,
            insufficient_max_component: 2,
            density_reference: 0.1,
        }
    }
}

impl GateConfig {
    fn validate(&self) -> Result<()> {
        unit("gate.convergence_component_ratio", self.convergence_component_ratio)?;
        unit("gate.convergence_model_ratio", self.convergence_model_ratio)?;
        unit("gate.convergence_max_isolation", self.convergence_max_isolation)?;
        unit("gate.insufficient_min_isolation", self.insufficient_min_isolation)?;
        if !(self.density_reference > 0.0 && self.density_reference <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "gate.density_reference must be in (0, 1], got {}",
                self.density_reference
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Region tiers
// ============================================================================

/// Minimums a region must meet for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Absolute minimum distinct models.
    pub min_models: usize,
    /// Minimum distinct models as a fraction of observed models.
    pub min_model_ratio: f64,
    pub min_density: f64,
}

impl TierThresholds {
    /// `max(absolute, ceil(ratio · total))`, never more than `total`.
    pub fn required_models(&self, total_models: usize) -> usize {
        let by_ratio = (self.min_model_ratio * total_models as f64).ceil() as usize;
        self.min_models.max(by_ratio).min(total_models.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub peak: TierThresholds,
    pub hill: TierThresholds,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            peak: TierThresholds { min_models: 3, min_model_ratio: 0.5, min_density: 0.30 },
            hill: TierThresholds { min_models: 2, min_model_ratio: 0.25, min_density: 0.10 },
        }
    }
}

impl TierConfig {
    fn validate(&self) -> Result<()> {
        for (name, t) in [("peak", &self.peak), ("hill", &self.hill)] {
            unit(&format!("tiers.{name}.min_model_ratio"), t.min_model_ratio)?;
            unit(&format!("tiers.{name}.min_density"), t.min_density)?;
        }
        Ok(())
    }
}

// ============================================================================
// Model ordering
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Upper bound on how much relevance can move a score.
    pub max_relevance_blend: f64,
    /// Multiplier from boost stddev to blend fraction.
    pub relevance_blend_scale: f64,
    /// Regions carried by at most this many models count as low-diversity.
    pub low_diversity_max_models: usize,
    /// Scores closer than this are treated as equal.
    pub score_epsilon: f64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            max_relevance_blend: 0.35,
            relevance_blend_scale: 2.0,
            low_diversity_max_models: 2,
            score_epsilon: 1e-9,
        }
    }
}

impl OrderingConfig {
    fn validate(&self) -> Result<()> {
        unit("ordering.max_relevance_blend", self.max_relevance_blend)?;
        non_negative("ordering.relevance_blend_scale", self.relevance_blend_scale)?;
        non_negative("ordering.score_epsilon", self.score_epsilon)
    }
}

// ============================================================================
// Claim alignment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub coverage_threshold: f64,
    /// Centroid distance (`1 - cos`) above which a claim spans too far.
    pub split_threshold: f64,
    pub merge_threshold: f64,
    /// Floor regions cited by at least this many claims are flagged.
    pub overclaim_min_claims: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.50,
            split_threshold: 0.85,
            merge_threshold: 0.92,
            overclaim_min_claims: 2,
        }
    }
}

impl AlignmentConfig {
    fn validate(&self) -> Result<()> {
        unit("alignment.coverage_threshold", self.coverage_threshold)?;
        non_negative("alignment.split_threshold", self.split_threshold)?;
        if self.split_threshold > 2.0 {
            return Err(Error::InvalidConfig(format!(
                "alignment.split_threshold must be at most 2 (cosine distance), got {}",
                self.split_threshold
            )));
        }
        unit("alignment.merge_threshold", self.merge_threshold)?;
        if self.overclaim_min_claims == 0 {
            return Err(Error::InvalidConfig("alignment.overclaim_min_claims must be at least 1".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_nan() || value < 0.0 {
        return Err(Error::InvalidConfig(format!("{name} must be non-negative, got {value}")));
    }
    Ok(())
}

fn unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidConfig(format!("{name} must be in [0, 1], got {value}")));
    }
    Ok(())
}
