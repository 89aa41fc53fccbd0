use ndarray::ArrayView2;
use serde::Serialize;
use std::cmp::Ordering;

use crate::dataset::Dataset;
use crate::error::{ClusterError, Result};

/// Performance band of a cluster, from its rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            1 => Tier::High,
            2 => Tier::Medium,
            _ => Tier::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Cluster index as labelled by the run.
    pub cluster: usize,
    /// 1 for the highest centroid mean.
    pub rank: usize,
    pub tier: Tier,
    pub size: usize,
    /// Percentage of all points in this cluster.
    pub share: f64,
    /// Mean of the centroid's components.
    pub centroid_mean: f64,
    /// Mean component value over the member points; `None` for an empty cluster.
    pub member_mean: Option<f64>,
}

/// Ranks clusters by the mean of their centroid's components, highest first,
/// ties going to the lower cluster index, and collects per-cluster counts.
pub fn summarize_clusters(
    data: &Dataset,
    labels: &[usize],
    centroids: ArrayView2<f64>,
) -> Result<Vec<ClusterSummary>> {
    if labels.len() != data.len() {
        return Err(ClusterError::LabelCountMismatch {
            labels: labels.len(),
            points: data.len(),
        });
    }

    let k = centroids.nrows();
    let mut sizes = vec![0usize; k];
    let mut member_sums = vec![0.0f64; k];
    for (point, &label) in data.iter().zip(labels.iter()) {
        if label >= k {
            return Err(ClusterError::LabelOutOfRange { label, k });
        }
        sizes[label] += 1;
        member_sums[label] += point.mean().unwrap_or(0.0);
    }

    let mut order: Vec<(usize, f64)> = centroids
        .rows()
        .into_iter()
        .map(|centroid| centroid.mean().unwrap_or(0.0))
        .enumerate()
        .collect();
    // stable sort keeps the lower index first on ties
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let total = data.len();
    Ok(order
        .into_iter()
        .enumerate()
        .map(|(position, (cluster, centroid_mean))| {
            let rank = position + 1;
            let size = sizes[cluster];
            ClusterSummary {
                cluster,
                rank,
                tier: Tier::from_rank(rank),
                size,
                share: if total > 0 { size as f64 * 100.0 / total as f64 } else { 0.0 },
                centroid_mean,
                member_mean: (size > 0).then(|| member_sums[cluster] / size as f64),
            }
        })
        .collect())
}
