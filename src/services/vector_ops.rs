//! Vector operations with parallel processing.

use rayon::prelude::*;

/// Utility struct for vector operations.
pub struct VectorOps;

impl VectorOps {
    /// Normalize a vector in-place to unit length.
    pub fn normalize_inplace(vector: &mut [f32]) {
        let norm: f32 = vector.par_iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.par_iter_mut().for_each(|x| *x /= norm);
        }
    }

    /// Normalize a vector and return a new vector.
    pub fn normalize(vector: &[f32]) -> Vec<f32> {
        let norm: f32 = vector.par_iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.par_iter().map(|x| x / norm).collect()
        } else {
            vector.to_vec()
        }
    }

    /// True when every vector has the same, non-zero length.
    pub fn uniform_dimension(vectors: &[Vec<f32>]) -> Option<usize> {
        let dim = vectors.first()?.len();
        if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
            None
        } else {
            Some(dim)
        }
    }
}
