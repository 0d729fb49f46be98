//! Top-k neighbor lists, the kNN graph and its mutual subgraph.
//!
//! Ordering rule everywhere: similarity descending, then neighbor ID
//! ascending. Ranks are 1-indexed.

use std::collections::BTreeMap;

use super::SimilarityMatrix;
use crate::model::{Edge, GraphKind, Neighbor, NeighborList, SimilarityGraph};

/// Per-node top-k lists, indexed like the matrix.
pub fn top_k_neighbors(matrix: &SimilarityMatrix, k: usize) -> Vec<NeighborList> {
    let ids = matrix.ids();
    (0..matrix.len())
        .map(|i| {
            let mut candidates: Vec<(usize, f64)> = (0..matrix.len())
                .filter(|&j| j != i)
                .filter_map(|j| matrix.get(i, j).map(|s| (j, s)))
                .collect();
            candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| ids[a.0].cmp(&ids[b.0])));
            candidates
                .into_iter()
                .take(k)
                .enumerate()
                .map(|(pos, (j, similarity))| Neighbor {
                    id: ids[j].clone(),
                    similarity,
                    rank: pos as u32 + 1,
                })
                .collect()
        })
        .collect()
}

fn rank_of(list: &NeighborList, id: &str) -> Option<u32> {
    list.iter().find(|n| n.id == id).map(|n| n.rank)
}

/// Symmetric union of every per-node top-k relation.
///
/// One record per canonical pair; rank is the best (lowest) rank either
/// endpoint gave the other.
pub fn build_knn_graph(matrix: &SimilarityMatrix, neighbors: &[NeighborList]) -> SimilarityGraph {
    let ids = matrix.ids();
    let mut pairs: BTreeMap<(String, String), Edge> = BTreeMap::new();
    for (i, list) in neighbors.iter().enumerate() {
        for n in list {
            let edge = Edge::canonical(&ids[i], &n.id, n.similarity, n.rank);
            pairs
                .entry((edge.source.clone(), edge.target.clone()))
                .and_modify(|e| e.rank = e.rank.min(n.rank))
                .or_insert(edge);
        }
    }
    SimilarityGraph::from_edges(
        GraphKind::Knn,
        ids.iter().map(String::as_str),
        pairs.into_values().collect(),
    )
}

/// kNN edges where each endpoint ranks the other within its own top-k.
/// Rank is the min of the two ranks.
pub fn build_mutual_graph(matrix: &SimilarityMatrix, neighbors: &[NeighborList]) -> SimilarityGraph {
    let ids = matrix.ids();
    let mut edges = Vec::new();
    for (i, list) in neighbors.iter().enumerate() {
        for n in list {
            if ids[i] >= n.id {
                continue;
            }
            let Some(j) = matrix.index_of(&n.id) else { continue };
            if let Some(back) = rank_of(&neighbors[j], &ids[i]) {
                edges.push(Edge::canonical(&ids[i], &n.id, n.similarity, n.rank.min(back)));
            }
        }
    }
    SimilarityGraph::from_edges(GraphKind::Mutual, ids.iter().map(String::as_str), edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmbeddingSet;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// a, b, c tight; d leans toward b; e leans toward c.
    fn fixture() -> (Vec<String>, EmbeddingSet) {
        let emb = EmbeddingSet::new("test")
            .with_vector("a", vec![1.0, 0.0, 0.0])
            .with_vector("b", vec![0.99, 0.141, 0.0])
            .with_vector("c", vec![0.99, 0.0, 0.141])
            .with_vector("d", vec![0.3, 0.954, 0.0])
            .with_vector("e", vec![0.3, 0.0, 0.954]);
        (ids(&["a", "b", "c", "d", "e"]), emb)
    }

    #[test]
    fn top_k_is_sorted_and_ranked() {
        let (ids, emb) = fixture();
        let m = SimilarityMatrix::compute(&ids, &emb);
        let lists = top_k_neighbors(&m, 2);
        assert_eq!(lists.len(), 5);
        for list in &lists {
            assert_eq!(list.len(), 2);
            assert_eq!(list[0].rank, 1);
            assert_eq!(list[1].rank, 2);
            assert!(list[0].similarity >= list[1].similarity);
        }
        // d's nearest is b
        assert_eq!(lists[3][0].id, "b");
    }

    #[test]
    fn ties_break_by_id() {
        let ids = ids(&["x", "b", "a"]);
        let emb = EmbeddingSet::new("test")
            .with_vector("x", vec![1.0, 0.0])
            .with_vector("b", vec![0.0, 1.0])
            .with_vector("a", vec![0.0, 1.0]);
        let m = SimilarityMatrix::compute(&ids, &emb);
        let lists = top_k_neighbors(&m, 2);
        let names: Vec<&str> = lists[0].iter().map(|n| n.id.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn knn_adjacency_is_symmetric() {
        let (ids, emb) = fixture();
        let m = SimilarityMatrix::compute(&ids, &emb);
        let lists = top_k_neighbors(&m, 2);
        let knn = build_knn_graph(&m, &lists);
        for e in &knn.edges {
            assert!(e.source < e.target);
            assert!(knn.neighbors(&e.source).contains(&e.target));
            assert!(knn.neighbors(&e.target).contains(&e.source));
        }
    }

    #[test]
    fn mutual_is_subset_of_knn() {
        let (ids, emb) = fixture();
        let m = SimilarityMatrix::compute(&ids, &emb);
        let lists = top_k_neighbors(&m, 2);
        let knn = build_knn_graph(&m, &lists);
        let mutual = build_mutual_graph(&m, &lists);
        assert_eq!(mutual.edge_count(), 3);
        for e in &mutual.edges {
            assert!(knn.contains_edge(&e.source, &e.target));
        }
        assert_eq!(mutual.degree("d"), 0);
        assert_eq!(mutual.degree("e"), 0);
    }
}
