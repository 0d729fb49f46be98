//! Connected components, topology metrics and shape signals.

use serde::{Deserialize, Serialize};

/// A maximal connected subgraph of a backbone graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// `comp_N`, assigned after sorting.
    pub id: String,
    /// Sorted lexicographically.
    pub node_ids: Vec<String>,
    pub size: usize,
    /// `internal_edges / (size * (size - 1) / 2)`; 0 for singletons.
    pub internal_density: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopologyMetrics {
    pub components: Vec<Component>,
    pub component_count: usize,
    pub largest_component_ratio: f64,
    /// Fraction of nodes with zero degree in the backbone.
    pub isolation_ratio: f64,
    pub global_density: f64,
    pub node_count: usize,
    pub edge_count: usize,
}

impl TopologyMetrics {
    pub fn largest(&self) -> Option<&Component> {
        self.components.first()
    }
}

/// Four continuous structural signals in [0, 1].
///
/// There is deliberately no categorical label here; each signal is a
/// measurement that can be checked against the topology it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeClassification {
    pub fragmentation: f64,
    pub bimodality: f64,
    pub parallelism: f64,
    pub convergence: f64,
    /// `max` of the four signals.
    pub confidence: f64,
}
