//! Edges and similarity graphs.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Undirected similarity edge. `source < target` lexicographically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub similarity: f64,
    pub rank: u32,
}

impl Edge {
    /// Build an edge with its endpoints in canonical order.
    pub fn canonical(a: &str, b: &str, similarity: f64, rank: u32) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source: source.to_string(),
            target: target.to_string(),
            similarity,
            rank,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.source, &self.target)
    }
}

/// Which graph variant an edge list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Knn,
    Mutual,
    Strong,
}

/// One edge record per pair; adjacency lists hold both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityGraph {
    pub kind: GraphKind,
    pub edges: Vec<Edge>,
    pub adjacency: BTreeMap<String, Vec<String>>,
}

impl SimilarityGraph {
    /// Empty graph over a node universe (every node gets an adjacency entry).
    pub fn empty<'a>(kind: GraphKind, node_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            kind,
            edges: Vec::new(),
            adjacency: node_ids.into_iter().map(|id| (id.to_string(), Vec::new())).collect(),
        }
    }

    /// Build from edges; sorts edges by key and neighbor lists lexicographically.
    pub fn from_edges<'a>(
        kind: GraphKind,
        node_ids: impl IntoIterator<Item = &'a str>,
        mut edges: Vec<Edge>,
    ) -> Self {
        let mut graph = Self::empty(kind, node_ids);
        edges.sort_by(|a, b| a.key().cmp(&b.key()));
        edges.dedup_by(|a, b| a.key() == b.key());
        for edge in &edges {
            graph.adjacency.entry(edge.source.clone()).or_default().push(edge.target.clone());
            graph.adjacency.entry(edge.target.clone()).or_default().push(edge.source.clone());
        }
        for neighbors in graph.adjacency.values_mut() {
            neighbors.sort();
        }
        graph.edges = edges;
        graph
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, Vec::len)
    }

    pub fn neighbors(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        self.find_edge(a, b).is_some()
    }

    pub fn find_edge(&self, a: &str, b: &str) -> Option<&Edge> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.edges
            .binary_search_by(|e| e.key().cmp(&key))
            .ok()
            .map(|i| &self.edges[i])
    }
}
