//! Shape signals: a pure function of topology metrics.
//!
//! Four continuous signals, each in [0, 1]. No categorical label and no
//! "expected cluster count" is derived from them.

use crate::model::{ShapeClassification, TopologyMetrics};

const FRAG_W_SPREAD: f64 = 0.4;
const FRAG_W_ISOLATION: f64 = 0.4;
const FRAG_W_SPARSITY: f64 = 0.2;

/// Component count at which parallelism saturates.
const PARALLEL_SATURATION: f64 = 5.0;
const PARALLEL_MIN_SIZE: usize = 3;

pub fn classify_shape(topology: &TopologyMetrics, node_count: usize) -> ShapeClassification {
    if node_count == 0 {
        return ShapeClassification::default();
    }
    let n = node_count as f64;
    let lcr = topology.largest_component_ratio.clamp(0.0, 1.0);

    let fragmentation = FRAG_W_SPREAD * (1.0 - lcr)
        + FRAG_W_ISOLATION * topology.isolation_ratio.clamp(0.0, 1.0)
        + FRAG_W_SPARSITY * (1.0 - topology.global_density.clamp(0.0, 1.0));

    let bimodality = match topology.components.as_slice() {
        [first, second, ..] if first.size > 0 => {
            let balance = second.size as f64 / first.size as f64;
            let coverage = (first.size + second.size) as f64 / n;
            balance * coverage
        }
        _ => 0.0,
    };

    let substantial = topology
        .components
        .iter()
        .filter(|c| c.size >= PARALLEL_MIN_SIZE)
        .count();
    let parallelism = substantial as f64 / PARALLEL_SATURATION;

    let fragmentation = fragmentation.clamp(0.0, 1.0);
    let bimodality = bimodality.clamp(0.0, 1.0);
    let parallelism = parallelism.clamp(0.0, 1.0);
    let convergence = lcr;

    ShapeClassification {
        fragmentation,
        bimodality,
        parallelism,
        convergence,
        confidence: fragmentation.max(bimodality).max(parallelism).max(convergence),
    }
}
