use ndarray::ArrayView2;

use crate::dataset::Dataset;
use crate::distance::squared_euclidean_distance;
use crate::error::{ClusterError, Result};

/// Within-cluster sum of squares: squared distance of every point to the
/// centroid its label points at.
pub fn compute_wcss(data: &Dataset, labels: &[usize], centroids: ArrayView2<f64>) -> Result<f64> {
    if labels.len() != data.len() {
        return Err(ClusterError::LabelCountMismatch {
            labels: labels.len(),
            points: data.len(),
        });
    }

    let k = centroids.nrows();
    data.iter()
        .zip(labels.iter())
        .map(|(point, &label)| {
            if label >= k {
                return Err(ClusterError::LabelOutOfRange { label, k });
            }
            squared_euclidean_distance(point, centroids.row(label))
        })
        .sum()
}
