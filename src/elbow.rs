use serde::{Deserialize, Serialize};

use crate::algorithm::{kmeans, KMeansConfig};
use crate::dataset::Dataset;
use crate::error::Result;

pub const DEFAULT_MAX_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WcssPoint {
    pub k: usize,
    pub wcss: f64,
}

/// WCSS per tested cluster count, ordered by `k`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WcssReport {
    pub points: Vec<WcssPoint>,
}

impl WcssReport {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The elbow: the interior point furthest from the straight line through
    /// the first and last `(k, wcss)` points. Reports with two or fewer
    /// entries fall back to the first `k`.
    pub fn optimal_k(&self) -> Option<usize> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        let mut optimal_k = first.k;
        if self.points.len() <= 2 {
            return Some(optimal_k);
        }

        let (x1, y1) = (first.k as f64, first.wcss);
        let (x2, y2) = (last.k as f64, last.wcss);
        let norm = ((y2 - y1).powi(2) + (x2 - x1).powi(2)).sqrt();

        let mut max_distance = 0.0;
        for point in &self.points[1..self.points.len() - 1] {
            let (x, y) = (point.k as f64, point.wcss);
            let distance = ((y2 - y1) * x - (x2 - x1) * y + x2 * y1 - y2 * x1).abs() / norm;
            if distance > max_distance {
                max_distance = distance;
                optimal_k = point.k;
            }
        }

        Some(optimal_k)
    }
}

/// Runs k-means for `k = 1..=max_k`, stopping early once `k` exceeds the
/// number of points, and records the WCSS of each run.
pub fn elbow_sweep(data: &Dataset, max_k: usize, config: &KMeansConfig) -> Result<WcssReport> {
    let mut report = WcssReport::default();

    for k in 1..=max_k {
        if data.len() < k {
            log::debug!("Stopping elbow sweep at k={}: only {} points", k, data.len());
            break;
        }

        let result = kmeans(data, k, config)?;
        let wcss = result.wcss(data)?;
        log::info!("k={} wcss={} ({} iterations)", k, wcss, result.n_iter);
        report.points.push(WcssPoint { k, wcss });
    }

    Ok(report)
}
