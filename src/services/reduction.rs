//! PCA dimensionality reduction ahead of density clustering.
//!
//! Sentence embeddings are too high-dimensional for HDBSCAN's distance
//! estimates to be meaningful, so documents are projected onto their top
//! principal components first. Eigenvectors come from power iteration with
//! deflation on whichever of the covariance (d×d) or Gram (n×n) matrix is
//! smaller.

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::error::{TopicError, TopicResult};
use crate::services::VectorOps;

const MAX_ITERATIONS: usize = 300;
const TOLERANCE: f64 = 1e-9;
const EPSILON: f64 = 1e-12;

/// Project `vectors` onto their top `n_components` principal components.
///
/// Input is returned unchanged when there is nothing to reduce: too few
/// rows, already small enough, or no variance at all.
pub fn reduce_dimensions(vectors: &[Vec<f32>], n_components: usize) -> TopicResult<Vec<Vec<f32>>> {
    let n = vectors.len();
    let dim = VectorOps::uniform_dimension(vectors)
        .ok_or_else(|| TopicError::Internal("embeddings have inconsistent dimensions".into()))?;

    if n_components == 0 || dim <= n_components || n <= n_components + 1 {
        debug!(n, dim, n_components, "Skipping dimensionality reduction");
        return Ok(vectors.to_vec());
    }

    let flat: Vec<f64> = vectors.iter().flatten().map(|&x| x as f64).collect();
    let data = Array2::from_shape_vec((n, dim), flat)
        .map_err(|e| TopicError::Internal(format!("embedding matrix: {}", e)))?;
    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| TopicError::Internal("empty embedding matrix".into()))?;
    let centered = &data - &mean;

    let scores = if dim <= n {
        let covariance = centered.t().dot(&centered);
        let components = top_eigenvectors(covariance, n_components);
        if components.is_empty() {
            return Ok(vectors.to_vec());
        }
        let mut basis = Array2::<f64>::zeros((dim, components.len()));
        for (k, (_, v)) in components.iter().enumerate() {
            basis.column_mut(k).assign(v);
        }
        centered.dot(&basis)
    } else {
        let gram = centered.dot(&centered.t());
        let components = top_eigenvectors(gram, n_components);
        if components.is_empty() {
            return Ok(vectors.to_vec());
        }
        let mut scores = Array2::<f64>::zeros((n, components.len()));
        for (k, (eigenvalue, u)) in components.iter().enumerate() {
            scores.column_mut(k).assign(&(u * eigenvalue.sqrt()));
        }
        scores
    };

    debug!(n, dim, components = scores.ncols(), "Reduced embeddings");

    Ok(scores
        .outer_iter()
        .map(|row| row.iter().map(|&x| x as f32).collect())
        .collect())
}

/// Leading eigenpairs of a symmetric positive semi-definite matrix.
fn top_eigenvectors(mut matrix: Array2<f64>, k: usize) -> Vec<(f64, Array1<f64>)> {
    let mut pairs = Vec::with_capacity(k);
    for _ in 0..k {
        let Some((eigenvalue, v)) = power_iteration(&matrix) else {
            break;
        };
        let column = v.view().insert_axis(Axis(1));
        let row = v.view().insert_axis(Axis(0));
        matrix = matrix - column.dot(&row) * eigenvalue;
        pairs.push((eigenvalue, v));
    }
    pairs
}

fn power_iteration(matrix: &Array2<f64>) -> Option<(f64, Array1<f64>)> {
    let size = matrix.nrows();
    // Deterministic, non-uniform start so it is not orthogonal to the answer.
    let mut v = Array1::from_iter((0..size).map(|i| 1.0 + (i as f64 * 0.618_033_988_75).fract()));
    let norm = v.dot(&v).sqrt();
    v /= norm;

    let mut eigenvalue = 0.0;
    for _ in 0..MAX_ITERATIONS {
        let next = matrix.dot(&v);
        let norm = next.dot(&next).sqrt();
        if norm < EPSILON {
            return None;
        }
        let next = next / norm;
        let delta: f64 = (&next - &v).mapv(f64::abs).sum();
        v = next;
        eigenvalue = v.dot(&matrix.dot(&v));
        if delta < TOLERANCE {
            break;
        }
    }

    if eigenvalue <= EPSILON {
        None
    } else {
        Some((eigenvalue, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_input_is_unchanged() {
        let vectors = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert_eq!(reduce_dimensions(&vectors, 2).unwrap(), vectors);
    }

    #[test]
    fn test_reduces_to_requested_components() {
        let vectors: Vec<Vec<f32>> = (0..10)
            .map(|i| {
                let t = i as f32;
                vec![t, 2.0 * t, 0.5 * t + (i % 2) as f32, -t, 3.0]
            })
            .collect();
        let reduced = reduce_dimensions(&vectors, 2).unwrap();
        assert_eq!(reduced.len(), 10);
        assert!(reduced.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn test_first_component_follows_main_axis() {
        // Points on a line along x with a tiny y jitter.
        let vectors: Vec<Vec<f32>> = (0..8)
            .map(|i| vec![i as f32, 0.01 * (i % 2) as f32, 0.0, 0.0])
            .collect();
        let reduced = reduce_dimensions(&vectors, 1).unwrap();
        let spread: Vec<f32> = reduced.iter().map(|r| r[0]).collect();
        let first = spread[0];
        let last = spread[7];
        assert!((last - first).abs() > 6.9, "expected spread of ~7, got {:?}", spread);
    }

    #[test]
    fn test_gram_path_when_dimension_exceeds_rows() {
        let vectors: Vec<Vec<f32>> = (0..6)
            .map(|i| (0..50).map(|j| ((i * j) % 7) as f32).collect())
            .collect();
        let reduced = reduce_dimensions(&vectors, 3).unwrap();
        assert_eq!(reduced.len(), 6);
        assert!(reduced.iter().all(|r| r.len() <= 3 && !r.is_empty()));
    }

    #[test]
    fn test_identical_points_are_returned_unchanged() {
        let vectors = vec![vec![1.0, 1.0, 1.0, 1.0]; 6];
        assert_eq!(reduce_dimensions(&vectors, 2).unwrap(), vectors);
    }

    #[test]
    fn test_inconsistent_dimensions_are_rejected() {
        let vectors = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(reduce_dimensions(&vectors, 1).is_err());
    }
}
