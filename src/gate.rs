//! # Pipeline Gate
//!
//! An advisory verdict over the substrate and its regions. Ordered decision
//! list, first match wins:
//!
//! | # | Verdict | Condition |
//! |---|---------|-----------|
//! | 1 | `skip_geometry` | substrate is degenerate |
//! | 2 | `trivial_convergence` | largest component dominant, model-diverse, little isolation |
//! | 3 | `insufficient_structure` | mostly isolated, no component above size 2 |
//! | 4 | `proceed` | otherwise |
//!
//! Only `skip_geometry` changes what happens downstream (model ordering falls
//! back to natural order). Evidence strings are for logs.

use tracing::debug;

use crate::config::GateConfig;
use crate::model::*;

/// Gather the measurements the decision list reads.
pub fn gate_measurements(substrate: &GeometricSubstrate, regions: &[Region]) -> GateMeasurements {
    let topology = &substrate.topology;
    let total_models = substrate.observed_models().len();
    let (largest_size, largest_diversity) = match topology.largest() {
        Some(c) => {
            let mut models: Vec<usize> = c
                .node_ids
                .iter()
                .filter_map(|id| substrate.node(id))
                .map(|n| n.model_index)
                .collect();
            models.sort_unstable();
            models.dedup();
            (c.size, models.len())
        }
        None => (0, 0),
    };
    GateMeasurements {
        degenerate: substrate.is_degenerate(),
        node_count: substrate.nodes.len(),
        largest_component_ratio: topology.largest_component_ratio,
        largest_component_size: largest_size,
        largest_component_model_diversity_ratio: if total_models == 0 {
            0.0
        } else {
            largest_diversity as f64 / total_models as f64
        },
        isolation_ratio: topology.isolation_ratio,
        global_density: topology.global_density,
        component_count: topology.component_count,
        region_count: regions.len(),
    }
}

pub fn evaluate_pipeline_gates(
    substrate: &GeometricSubstrate,
    regions: &[Region],
    config: &GateConfig,
) -> PipelineGateResult {
    let result = evaluate_gate_measurements(&gate_measurements(substrate, regions), config);
    debug!(
        verdict = result.verdict.as_str(),
        confidence = result.confidence,
        "pipeline gate evaluated"
    );
    result
}

/// The decision list itself, over raw measurements.
pub fn evaluate_gate_measurements(m: &GateMeasurements, config: &GateConfig) -> PipelineGateResult {
    let verdict_of = |verdict, confidence: f64, evidence| PipelineGateResult {
        verdict,
        confidence: confidence.clamp(0.0, 1.0),
        evidence,
        measurements: *m,
    };

    // 1. degenerate
    if m.degenerate {
        return verdict_of(
            GateVerdict::SkipGeometry,
            1.0,
            vec![format!("degenerate substrate over {} node(s)", m.node_count)],
        );
    }

    // 2. trivial convergence
    if m.largest_component_ratio > config.convergence_component_ratio
        && m.largest_component_model_diversity_ratio > config.convergence_model_ratio
        && m.isolation_ratio < config.convergence_max_isolation
    {
        let margins = [
            excess(m.largest_component_ratio, config.convergence_component_ratio, 1.0),
            excess(m.largest_component_model_diversity_ratio, config.convergence_model_ratio, 1.0),
            shortfall(m.isolation_ratio, config.convergence_max_isolation),
        ];
        let confidence = margins.iter().sum::<f64>() / margins.len() as f64;
        return verdict_of(
            GateVerdict::TrivialConvergence,
            confidence,
            vec![
                format!("largest component holds {:.0}% of nodes", m.largest_component_ratio * 100.0),
                format!(
                    "largest component spans {:.0}% of models",
                    m.largest_component_model_diversity_ratio * 100.0
                ),
                format!("isolation ratio {:.2}", m.isolation_ratio),
            ],
        );
    }

    // 3. insufficient structure
    if m.isolation_ratio > config.insufficient_min_isolation
        && m.largest_component_size <= config.insufficient_max_component
    {
        let confidence = 0.5 + 0.5 * excess(m.isolation_ratio, config.insufficient_min_isolation, 1.0);
        return verdict_of(
            GateVerdict::InsufficientStructure,
            confidence,
            vec![
                format!("isolation ratio {:.2}", m.isolation_ratio),
                format!("largest component size {}", m.largest_component_size),
            ],
        );
    }

    // 4. proceed
    let density_score = (m.global_density / config.density_reference).min(1.0);
    let confidence = 0.5 * density_score + 0.5 * (1.0 - m.isolation_ratio);
    verdict_of(
        GateVerdict::Proceed,
        confidence,
        vec![
            format!("{} component(s), {} region(s)", m.component_count, m.region_count),
            format!("global density {:.3}, isolation {:.2}", m.global_density, m.isolation_ratio),
        ],
    )
}

/// How far `value` exceeds `floor`, as a fraction of the room up to `ceiling`.
fn excess(value: f64, floor: f64, ceiling: f64) -> f64 {
    let room = ceiling - floor;
    if room <= 0.0 {
        return 1.0;
    }
    ((value - floor) / room).clamp(0.0, 1.0)
}

/// How far `value` sits below `cap`, as a fraction of `cap`.
fn shortfall(value: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 1.0;
    }
    ((cap - value) / cap).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> GateMeasurements {
        GateMeasurements {
            degenerate: false,
            node_count: 20,
            largest_component_ratio: 0.3,
            largest_component_size: 2,
            largest_component_model_diversity_ratio: 0.5,
            isolation_ratio: 0.2,
            global_density: 0.05,
            component_count: 8,
            region_count: 10,
        }
    }

    #[test]
    fn degenerate_skips() {
        let m = GateMeasurements { degenerate: true, ..base() };
        let r = evaluate_gate_measurements(&m, &GateConfig::default());
        assert_eq!(r.verdict, GateVerdict::SkipGeometry);
        assert_eq!(r.confidence, 1.0);
        assert!(!r.verdict.allows_geometry());
    }

    #[test]
    fn dominant_diverse_component_is_trivial() {
        let m = GateMeasurements {
            largest_component_ratio: 0.95,
            largest_component_size: 19,
            largest_component_model_diversity_ratio: 1.0,
            isolation_ratio: 0.05,
            ..base()
        };
        let r = evaluate_gate_measurements(&m, &GateConfig::default());
        assert_eq!(r.verdict, GateVerdict::TrivialConvergence);
        // (0.1/0.15 + 1.0 + 0.5) / 3
        assert!((r.confidence - (0.10 / 0.15 + 1.0 + 0.5) / 3.0).abs() < 1e-9);
        assert!(r.verdict.allows_geometry());
    }

    #[test]
    fn isolated_input_is_insufficient() {
        let m = GateMeasurements { isolation_ratio: 0.85, ..base() };
        let r = evaluate_gate_measurements(&m, &GateConfig::default());
        assert_eq!(r.verdict, GateVerdict::InsufficientStructure);
        assert!((r.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn proceed_blends_density_and_isolation() {
        let r = evaluate_gate_measurements(&base(), &GateConfig::default());
        assert_eq!(r.verdict, GateVerdict::Proceed);
        assert!((r.confidence - (0.5 * 0.5 + 0.5 * 0.8)).abs() < 1e-9);
        assert_eq!(r.evidence.len(), 2);
    }

    #[test]
    fn isolation_sweep_is_monotone() {
        let config = GateConfig::default();
        let mut flipped = false;
        for step in 0..=100 {
            let m = GateMeasurements { isolation_ratio: step as f64 / 100.0, ..base() };
            let verdict = evaluate_gate_measurements(&m, &config).verdict;
            match verdict {
                GateVerdict::InsufficientStructure => flipped = true,
                GateVerdict::Proceed => assert!(!flipped, "reverted to proceed at step {step}"),
                other => panic!("unexpected verdict {other}"),
            }
        }
        assert!(flipped);
    }
}
