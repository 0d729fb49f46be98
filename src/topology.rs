//! # Topology Analyzer
//!
//! Connected components over any backbone graph. Node IDs are mapped to a
//! dense arena index once; union-find then runs on plain integer arrays.
//!
//! ```text
//! node universe ─┐
//!                ├─> UnionFind ─> group by root ─> sort ─> comp_0, comp_1, …
//! backbone edges ┘
//! ```
//!
//! Component order: size descending, then smallest member ID ascending.
//! IDs are assigned only after sorting.

use hashbrown::HashMap;

use crate::model::{Component, SimilarityGraph, TopologyMetrics};

// ============================================================================
// Union-find
// ============================================================================

/// Disjoint sets over `0..n` with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while x != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    /// Merge the sets of `x` and `y`. Returns false if already joined.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let px = self.find(x);
        let py = self.find(y);
        if px == py {
            return false;
        }
        match self.rank[px].cmp(&self.rank[py]) {
            std::cmp::Ordering::Less => self.parent[px] = py,
            std::cmp::Ordering::Greater => self.parent[py] = px,
            std::cmp::Ordering::Equal => {
                self.parent[py] = px;
                self.rank[px] = self.rank[px].saturating_add(1);
            }
        }
        true
    }
}

// ============================================================================
// Components + metrics
// ============================================================================

/// Components and aggregate metrics of `graph` over the full `node_ids`
/// universe. Nodes without edges become singleton components; edges naming
/// unknown nodes are ignored.
pub fn compute_topology<'a>(
    node_ids: impl IntoIterator<Item = &'a str>,
    graph: &SimilarityGraph,
) -> TopologyMetrics {
    let ids: Vec<&str> = node_ids.into_iter().collect();
    let n = ids.len();
    let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut uf = UnionFind::new(n);
    let mut edge_count = 0usize;
    let mut degree = vec![0usize; n];
    let mut edge_list: Vec<(usize, usize)> = Vec::with_capacity(graph.edges.len());
    for e in &graph.edges {
        let (Some(&a), Some(&b)) = (index.get(e.source.as_str()), index.get(e.target.as_str())) else {
            continue;
        };
        if a == b {
            continue;
        }
        uf.union(a, b);
        degree[a] += 1;
        degree[b] += 1;
        edge_count += 1;
        edge_list.push((a, b));
    }

    // group by root; internal edge counts per root
    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..n {
        let root = uf.find(i);
        groups.entry(root).or_default().push(i);
    }
    let mut internal: HashMap<usize, usize> = HashMap::new();
    for &(a, _) in &edge_list {
        *internal.entry(uf.find(a)).or_default() += 1;
    }

    let mut components: Vec<Component> = groups
        .into_iter()
        .map(|(root, members)| {
            let mut node_ids: Vec<String> = members.iter().map(|&i| ids[i].to_string()).collect();
            node_ids.sort();
            let size = node_ids.len();
            let edges = internal.get(&root).copied().unwrap_or(0);
            Component {
                id: String::new(),
                internal_density: pair_density(edges, size),
                node_ids,
                size,
            }
        })
        .collect();

    components.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.node_ids[0].cmp(&b.node_ids[0])));
    for (i, c) in components.iter_mut().enumerate() {
        c.id = format!("comp_{i}");
    }

    let largest = components.first().map_or(0, |c| c.size);
    let isolated = degree.iter().filter(|&&d| d == 0).count();
    TopologyMetrics {
        component_count: components.len(),
        components,
        largest_component_ratio: ratio(largest, n),
        isolation_ratio: ratio(isolated, n),
        global_density: pair_density(edge_count, n),
        node_count: n,
        edge_count,
    }
}

/// Edges over possible undirected pairs among `size` nodes.
pub fn pair_density(edges: usize, size: usize) -> f64 {
    if size < 2 {
        return 0.0;
    }
    let possible = size * (size - 1) / 2;
    (edges as f64 / possible as f64).min(1.0)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, GraphKind};
    use pretty_assertions::assert_eq;

    fn graph(ids: &[&'static str], pairs: &[(&str, &str)]) -> SimilarityGraph {
        SimilarityGraph::from_edges(
            GraphKind::Strong,
            ids.iter().copied(),
            pairs.iter().map(|(a, b)| Edge::canonical(a, b, 0.9, 1)).collect(),
        )
    }

    #[test]
    fn union_find_merges_and_compresses() {
        let mut uf = UnionFind::new(5);
        assert!(uf.union(0, 1));
        assert!(uf.union(1, 2));
        assert!(!uf.union(0, 2));
        assert_eq!(uf.find(2), uf.find(0));
        assert_ne!(uf.find(3), uf.find(0));
        assert_eq!(uf.len(), 5);
    }

    #[test]
    fn isolated_nodes_become_singletons() {
        let ids = ["a", "b", "c"];
        let g = graph(&ids, &[]);
        let t = compute_topology(ids, &g);
        assert_eq!(t.component_count, 3);
        assert_eq!(t.isolation_ratio, 1.0);
        assert_eq!(t.global_density, 0.0);
        let names: Vec<&str> = t.components.iter().map(|c| c.node_ids[0].as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn components_sorted_and_reided() {
        let ids = ["e", "d", "c", "b", "a", "z"];
        let g = graph(&ids, &[("d", "e"), ("a", "b"), ("b", "c")]);
        let t = compute_topology(ids, &g);
        assert_eq!(t.component_count, 3);
        assert_eq!(t.components[0].id, "comp_0");
        assert_eq!(t.components[0].node_ids, vec!["a", "b", "c"]);
        assert_eq!(t.components[1].node_ids, vec!["d", "e"]);
        assert_eq!(t.components[2].node_ids, vec!["z"]);
        assert_eq!(t.largest_component_ratio, 0.5);
        assert!((t.isolation_ratio - 1.0 / 6.0).abs() < 1e-12);
        // path a-b-c: 2 of 3 possible pairs
        assert!((t.components[0].internal_density - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(t.components[1].internal_density, 1.0);
    }

    #[test]
    fn sizes_sum_to_universe() {
        let ids = ["a", "b", "c", "d"];
        let g = graph(&ids, &[("a", "d")]);
        let t = compute_topology(ids, &g);
        let total: usize = t.components.iter().map(|c| c.size).sum();
        assert_eq!(total, 4);
        assert!((t.global_density - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn empty_universe() {
        let g = graph(&[], &[]);
        let t = compute_topology(std::iter::empty(), &g);
        assert_eq!(t.component_count, 0);
        assert_eq!(t.largest_component_ratio, 0.0);
        assert_eq!(t.isolation_ratio, 0.0);
    }
}
