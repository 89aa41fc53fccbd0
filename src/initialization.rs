use itertools::Itertools;
use ndarray::{Array2, Axis};
use rand::{seq::index, Rng};

use crate::dataset::Dataset;
use crate::error::{ClusterError, Result};

/// How the first set of centroids is chosen.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Initialization {
    /// `k` distinct data points sampled uniformly without replacement.
    #[default]
    Random,
    /// Caller-provided starting centroids, one row per cluster.
    Centroids(Vec<Vec<f64>>),
}

pub fn random_initialization<R: Rng + ?Sized>(data: &Dataset, k: usize, rng: &mut R) -> Array2<f64> {
    let picked = index::sample(rng, data.len(), k).into_vec();
    log::debug!("Initial centroids drawn from points {:?}", picked);

    data.points().select(Axis(0), &picked)
}

pub fn provided_initialization(data: &Dataset, k: usize, centroids: &[Vec<f64>]) -> Result<Array2<f64>> {
    if centroids.len() != k {
        return Err(ClusterError::InvalidInitialCentroids(format!(
            "expected {} centroids, got {}",
            k,
            centroids.len()
        )));
    }

    let dim = data.dim();
    if let Some((idx, bad)) = centroids.iter().find_position(|c| c.len() != dim) {
        return Err(ClusterError::InvalidInitialCentroids(format!(
            "centroid #{} has {} components, data has {}",
            idx,
            bad.len(),
            dim
        )));
    }

    Ok(Array2::from_shape_fn((k, dim), |(row, col)| centroids[row][col]))
}

pub fn initialize_centroids<R: Rng + ?Sized>(
    data: &Dataset,
    k: usize,
    initialization: &Initialization,
    rng: &mut R,
) -> Result<Array2<f64>> {
    match initialization {
        Initialization::Random => Ok(random_initialization(data, k, rng)),
        Initialization::Centroids(centroids) => provided_initialization(data, k, centroids),
    }
}
