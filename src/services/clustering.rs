//! Density clustering: batch-size heuristic and HDBSCAN.

use hdbscan::{Hdbscan, HdbscanHyperParams};
use std::collections::hash_map::{Entry, HashMap};
use tracing::debug;

use crate::error::{TopicError, TopicResult};

/// Cluster id HDBSCAN gives to points that belong to no cluster.
pub const NOISE: i32 = -1;

/// Hyperparameters chosen per request from the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterParams {
    pub min_cluster_size: usize,
    pub min_samples: usize,
    pub n_components: usize,
}

impl ClusterParams {
    /// Scale cluster granularity with the number of emails.
    ///
    /// Small inboxes get small clusters (down to pairs); large ones need
    /// roughly 1/15th of the batch to form a topic, capped at 25.
    pub fn for_batch(n: usize, reduced_dimensions: usize) -> Self {
        let min_cluster_size = ((n as f64 / 15.0).round() as usize).clamp(2, 25).min(n.max(1));
        let min_samples = (min_cluster_size / 2).clamp(1, min_cluster_size);
        let n_components = reduced_dimensions.min(n.saturating_sub(1));
        Self {
            min_cluster_size,
            min_samples,
            n_components,
        }
    }
}

/// Run HDBSCAN and return one label per point; [`NOISE`] marks outliers.
///
/// Exact duplicates are clustered once and share the label of their unique
/// point. A stack of at least `min_cluster_size` identical points is a
/// cluster of its own even when HDBSCAN, seeing a single point, calls it noise.
pub fn cluster_points(points: Vec<Vec<f32>>, params: &ClusterParams) -> TopicResult<Vec<i32>> {
    let min_points = params.min_cluster_size.max(2);
    if points.len() < min_points {
        return Ok(vec![NOISE; points.len()]);
    }
    if points.iter().flatten().any(|x| !x.is_finite()) {
        return Err(TopicError::Clustering("non-finite coordinate in embeddings".into()));
    }

    let (unique, assignment) = dedupe(points);
    let mut multiplicity = vec![0usize; unique.len()];
    for &u in &assignment {
        multiplicity[u] += 1;
    }

    let mut unique_labels = if unique.len() >= min_points {
        let hyper_params = HdbscanHyperParams::builder()
            .min_cluster_size(params.min_cluster_size)
            .min_samples(params.min_samples)
            .build();
        Hdbscan::new(&unique, hyper_params)
            .cluster()
            .map_err(|e| TopicError::Clustering(format!("{:?}", e)))?
    } else {
        vec![NOISE; unique.len()]
    };

    let mut next_id = unique_labels.iter().copied().max().unwrap_or(NOISE) + 1;
    for (label, &count) in unique_labels.iter_mut().zip(&multiplicity) {
        if *label == NOISE && count >= params.min_cluster_size {
            *label = next_id;
            next_id += 1;
        }
    }

    let labels: Vec<i32> = assignment.iter().map(|&u| unique_labels[u]).collect();
    debug!(
        points = labels.len(),
        unique = unique.len(),
        clusters = distinct_clusters(&labels),
        noise = labels.iter().filter(|&&l| l == NOISE).count(),
        "HDBSCAN finished"
    );

    Ok(labels)
}

/// Collapse bit-identical points. Returns the unique points and, for every
/// input point, the index of its unique point.
fn dedupe(points: Vec<Vec<f32>>) -> (Vec<Vec<f32>>, Vec<usize>) {
    let mut index: HashMap<Vec<u32>, usize> = HashMap::with_capacity(points.len());
    let mut unique = Vec::new();
    let mut assignment = Vec::with_capacity(points.len());
    for point in points {
        let key = point.iter().map(|x| x.to_bits()).collect();
        match index.entry(key) {
            Entry::Occupied(entry) => assignment.push(*entry.get()),
            Entry::Vacant(entry) => {
                entry.insert(unique.len());
                assignment.push(unique.len());
                unique.push(point);
            }
        }
    }
    (unique, assignment)
}

/// Number of distinct non-noise cluster ids.
pub fn distinct_clusters(labels: &[i32]) -> usize {
    let mut ids: Vec<i32> = labels.iter().copied().filter(|&l| l != NOISE).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_small_batch() {
        let params = ClusterParams::for_batch(3, 5);
        assert_eq!(params.min_cluster_size, 2);
        assert_eq!(params.min_samples, 1);
        assert_eq!(params.n_components, 2);
    }

    #[test]
    fn test_params_scale_with_batch() {
        let params = ClusterParams::for_batch(150, 5);
        assert_eq!(params.min_cluster_size, 10);
        assert_eq!(params.min_samples, 5);
        assert_eq!(params.n_components, 5);

        let params = ClusterParams::for_batch(5000, 5);
        assert_eq!(params.min_cluster_size, 25);
    }

    #[test]
    fn test_too_few_points_are_noise() {
        let params = ClusterParams {
            min_cluster_size: 3,
            min_samples: 1,
            n_components: 2,
        };
        let labels = cluster_points(vec![vec![0.0, 0.0], vec![1.0, 1.0]], &params).unwrap();
        assert_eq!(labels, vec![NOISE, NOISE]);
    }

    #[test]
    fn test_separated_blobs_do_not_share_clusters() {
        let mut points = Vec::new();
        for i in 0..5 {
            points.push(vec![0.0 + 0.01 * i as f32, 0.0]);
        }
        for i in 0..5 {
            points.push(vec![10.0 + 0.01 * i as f32, 10.0]);
        }
        let params = ClusterParams::for_batch(points.len(), 5);
        let labels = cluster_points(points, &params).unwrap();

        assert_eq!(labels.len(), 10);
        assert!(distinct_clusters(&labels) >= 1);
        for a in &labels[..5] {
            for b in &labels[5..] {
                assert!(*a == NOISE || *a != *b, "blobs merged: {:?}", labels);
            }
        }
    }

    #[test]
    fn test_dedupe_maps_copies_to_one_point() {
        let points = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![1.0, 2.0], vec![1.0, 2.0]];
        let (unique, assignment) = dedupe(points);
        assert_eq!(unique, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(assignment, vec![0, 1, 0, 0]);
    }

    #[test]
    fn test_identical_points_share_one_cluster() {
        let points = vec![vec![0.3, -1.2, 4.0]; 7];
        let params = ClusterParams::for_batch(points.len(), 5);
        let labels = cluster_points(points, &params).unwrap();
        assert_ne!(labels[0], NOISE);
        assert!(labels.iter().all(|&l| l == labels[0]), "copies split: {:?}", labels);
    }

    #[test]
    fn test_identical_groups_still_cluster() {
        let mut points = vec![vec![0.0, 0.0]; 4];
        points.extend(vec![vec![5.0, 5.0]; 4]);
        let params = ClusterParams::for_batch(points.len(), 5);
        let labels = cluster_points(points, &params).unwrap();
        assert_eq!(labels.len(), 8);
        for group in [&labels[..4], &labels[4..]] {
            assert_ne!(group[0], NOISE, "copies left as noise: {:?}", labels);
            assert!(group.iter().all(|&l| l == group[0]), "copies split: {:?}", labels);
        }
    }

    #[test]
    fn test_duplicate_stack_among_distinct_points() {
        let mut points = Vec::new();
        for i in 0..5 {
            points.push(vec![0.01 * i as f32, 0.0]);
            points.push(vec![10.0 + 0.01 * i as f32, 0.0]);
        }
        points.extend(vec![vec![5.0, 8.0]; 4]);
        let params = ClusterParams::for_batch(points.len(), 5);
        let labels = cluster_points(points, &params).unwrap();

        let stack = &labels[10..];
        assert_ne!(stack[0], NOISE, "duplicate stack left as noise: {:?}", labels);
        assert!(stack.iter().all(|&l| l == stack[0]), "copies split: {:?}", labels);
    }

    #[test]
    fn test_non_finite_points_are_rejected() {
        let params = ClusterParams::for_batch(3, 5);
        let points = vec![vec![0.0], vec![f32::NAN], vec![1.0]];
        assert!(cluster_points(points, &params).is_err());
    }

    #[test]
    fn test_distinct_clusters_ignores_noise() {
        assert_eq!(distinct_clusters(&[NOISE, 0, 0, 1, NOISE, 2]), 3);
        assert_eq!(distinct_clusters(&[NOISE, NOISE]), 0);
    }
}
