//! # Similarity Primitives
//!
//! Cosine similarity, quantization and the dense O(n²) pairwise pass that
//! every graph variant is derived from.
//!
//! | Module | Builds |
//! |--------|--------|
//! | `knn` | per-node top-k lists, kNN graph, mutual kNN graph |
//! | `threshold` | soft threshold, strong graph, similarity stats |
//!
//! Rows of the matrix are independent. With the `parallel` feature they are
//! computed on the rayon pool; each cell is still produced by the same
//! in-order accumulation, so results are bit-identical either way.

pub mod knn;
pub mod threshold;

use hashbrown::HashMap;

use crate::config::QUANTIZATION;
use crate::model::EmbeddingSet;

const QUANTIZATION_SCALE: f64 = 1.0 / QUANTIZATION;

/// Round to the substrate resolution. Every similarity passes through here
/// before it is compared with anything.
#[inline]
pub fn quantize(x: f64) -> f64 {
    (x * QUANTIZATION_SCALE).round() / QUANTIZATION_SCALE
}

/// Cosine similarity with f64 accumulation in index order.
///
/// Returns `None` for mismatched dimensions, empty vectors or zero norms;
/// callers treat that as "no similarity" rather than an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na <= 0.0 || nb <= 0.0 {
        return None;
    }
    let sim = dot / (na.sqrt() * nb.sqrt());
    if sim.is_finite() {
        Some(sim.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Quantized cosine similarity.
#[inline]
pub fn quantized_cosine(a: &[f32], b: &[f32]) -> Option<f64> {
    cosine_similarity(a, b).map(quantize)
}

/// Mean-pool vectors of a common dimension and renormalize to unit length.
///
/// Vectors whose dimension differs from the first are skipped. Returns
/// `None` when nothing survives or the mean is the zero vector.
pub fn mean_pool<'a>(vectors: impl IntoIterator<Item = &'a [f32]>) -> Option<Vec<f32>> {
    let mut sum: Vec<f64> = Vec::new();
    let mut count = 0usize;
    for v in vectors {
        if v.is_empty() {
            continue;
        }
        if sum.is_empty() {
            sum = vec![0.0; v.len()];
        } else if v.len() != sum.len() {
            continue;
        }
        for (s, &x) in sum.iter_mut().zip(v.iter()) {
            *s += x as f64;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let norm = sum.iter().map(|s| s * s).sum::<f64>().sqrt();
    if norm <= 0.0 || !norm.is_finite() {
        return None;
    }
    Some(sum.iter().map(|s| (s / norm) as f32).collect())
}

// ============================================================================
// Pairwise matrix
// ============================================================================

/// Dense symmetric matrix of quantized similarities over an ordered ID list.
///
/// The diagonal and any pair lacking a usable embedding hold `None`.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    cells: Vec<Option<f64>>,
    /// Pairs skipped because both vectors existed but dimensions differed.
    dimension_mismatches: usize,
}

impl SimilarityMatrix {
    /// Compute all pairwise similarities for `ids` in the given order.
    pub fn compute(ids: &[String], embeddings: &EmbeddingSet) -> Self {
        let n = ids.len();
        let vectors: Vec<Option<&[f32]>> = ids.iter().map(|id| embeddings.get(id)).collect();

        let rows = compute_rows(&vectors);

        let mut cells = vec![None; n * n];
        let mut dimension_mismatches = 0;
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, cell) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                match cell {
                    PairCell::Sim(s) => {
                        cells[i * n + j] = Some(s);
                        cells[j * n + i] = Some(s);
                    }
                    PairCell::Mismatch => dimension_mismatches += 1,
                    PairCell::Missing => {}
                }
            }
        }

        let index = ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
        Self {
            ids: ids.to_vec(),
            index,
            cells,
            dimension_mismatches,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells[i * self.ids.len() + j]
    }

    pub fn get_by_id(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.get(i, j)
    }

    pub fn dimension_mismatches(&self) -> usize {
        self.dimension_mismatches
    }

    /// Every defined upper-triangle similarity, in row-major order.
    pub fn upper_triangle(&self) -> impl Iterator<Item = f64> + '_ {
        let n = self.ids.len();
        (0..n).flat_map(move |i| ((i + 1)..n).filter_map(move |j| self.get(i, j)))
    }

    /// True when at least two pairs exist and every pair has the same value.
    /// A single comparable pair has no distribution to collapse.
    pub fn is_collapsed(&self) -> bool {
        let mut values = self.upper_triangle();
        let (Some(first), Some(second)) = (values.next(), values.next()) else {
            return false;
        };
        second == first && values.all(|v| v == first)
    }
}

#[derive(Debug, Clone, Copy)]
enum PairCell {
    Sim(f64),
    Missing,
    Mismatch,
}

fn pair_cell(a: Option<&[f32]>, b: Option<&[f32]>) -> PairCell {
    match (a, b) {
        (Some(a), Some(b)) if a.len() != b.len() => PairCell::Mismatch,
        (Some(a), Some(b)) => quantized_cosine(a, b).map_or(PairCell::Missing, PairCell::Sim),
        _ => PairCell::Missing,
    }
}

/// Upper-triangle rows: row `i` holds pairs `(i, j)` for `j > i`.
#[cfg(not(feature = "parallel"))]
fn compute_rows(vectors: &[Option<&[f32]>]) -> Vec<Vec<PairCell>> {
    (0..vectors.len())
        .map(|i| ((i + 1)..vectors.len()).map(|j| pair_cell(vectors[i], vectors[j])).collect())
        .collect()
}

#[cfg(feature = "parallel")]
fn compute_rows(vectors: &[Option<&[f32]>]) -> Vec<Vec<PairCell>> {
    use rayon::prelude::*;
    (0..vectors.len())
        .into_par_iter()
        .map(|i| ((i + 1)..vectors.len()).map(|j| pair_cell(vectors[i], vectors[j])).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3f32, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(quantized_cosine(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
    }

    #[test]
    fn cosine_skips_bad_input() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn quantize_rounds_to_resolution() {
        assert_eq!(quantize(0.123_456_78), quantize(0.123_457));
        assert!((quantize(0.9999999) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mean_pool_renormalizes() {
        let pooled = mean_pool([&[1.0f32, 0.0][..], &[0.0, 1.0][..]]).unwrap();
        let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert!((pooled[0] - pooled[1]).abs() < 1e-6);
    }

    #[test]
    fn mean_pool_of_nothing_is_none() {
        assert!(mean_pool(std::iter::empty::<&[f32]>()).is_none());
        assert!(mean_pool([&[1.0f32, 0.0][..], &[-1.0, 0.0][..]]).is_none());
    }

    #[test]
    fn matrix_is_symmetric_with_empty_diagonal() {
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let emb = EmbeddingSet::new("test")
            .with_vector("a", vec![1.0, 0.0])
            .with_vector("b", vec![0.6, 0.8])
            .with_vector("c", vec![0.0, 1.0]);
        let m = SimilarityMatrix::compute(&ids, &emb);
        for i in 0..3 {
            assert_eq!(m.get(i, i), None);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert_eq!(m.get_by_id("a", "b"), Some(0.6));
        assert!(!m.is_collapsed());
    }

    #[test]
    fn matrix_counts_dimension_mismatches() {
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let emb = EmbeddingSet::new("test")
            .with_vector("a", vec![1.0, 0.0])
            .with_vector("b", vec![0.6, 0.8, 0.0])
            .with_vector("c", vec![0.0, 1.0]);
        let m = SimilarityMatrix::compute(&ids, &emb);
        assert_eq!(m.dimension_mismatches(), 2);
        assert_eq!(m.get_by_id("a", "b"), None);
        assert_eq!(m.get_by_id("a", "c"), Some(0.0));
    }

    #[test]
    fn identical_vectors_collapse() {
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let emb = EmbeddingSet::new("test")
            .with_vector("a", vec![1.0, 1.0])
            .with_vector("b", vec![1.0, 1.0])
            .with_vector("c", vec![1.0, 1.0]);
        assert!(SimilarityMatrix::compute(&ids, &emb).is_collapsed());
    }

    #[test]
    fn single_pair_is_not_collapsed() {
        let ids: Vec<String> = ["p0", "p1", "p2"].iter().map(|s| s.to_string()).collect();
        let emb = EmbeddingSet::new("test")
            .with_vector("p0", vec![1.0, 0.0])
            .with_vector("p1", vec![0.7, 0.7]);
        let m = SimilarityMatrix::compute(&ids, &emb);
        assert_eq!(m.upper_triangle().count(), 1);
        assert!(!m.is_collapsed());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_rows_match_serial_cells() {
        let ids: Vec<String> = (0..40).map(|i| format!("p{i:02}")).collect();
        let mut emb = EmbeddingSet::new("test");
        for (i, id) in ids.iter().enumerate() {
            match i % 7 {
                // gap
                0 => {}
                // wrong dimension
                1 => emb.insert(id.clone(), vec![1.0, 0.5]),
                _ => {
                    let t = i as f32 * 0.37;
                    emb.insert(id.clone(), vec![t.cos(), t.sin(), (t * 0.5).cos()]);
                }
            }
        }
        let m = SimilarityMatrix::compute(&ids, &emb);
        let vectors: Vec<Option<&[f32]>> = ids.iter().map(|id| emb.get(id)).collect();

        let mut mismatches = 0;
        for i in 0..ids.len() {
            assert_eq!(m.get(i, i), None);
            for j in (i + 1)..ids.len() {
                let expected = match pair_cell(vectors[i], vectors[j]) {
                    PairCell::Sim(s) => Some(s.to_bits()),
                    PairCell::Mismatch => {
                        mismatches += 1;
                        None
                    }
                    PairCell::Missing => None,
                };
                assert_eq!(m.get(i, j).map(f64::to_bits), expected, "cell ({i}, {j})");
                assert_eq!(m.get(j, i).map(f64::to_bits), expected, "cell ({j}, {i})");
            }
        }
        assert!(mismatches > 0);
        assert_eq!(m.dimension_mismatches(), mismatches);
    }
}
