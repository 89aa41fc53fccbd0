use ndarray::{Array1, Array2, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::centroid::Centroid;
use crate::dataset::Dataset;
use crate::distance::euclidean_distance;
use crate::error::{ClusterError, Result};
use crate::initialization::{initialize_centroids, Initialization};
use crate::summary::{summarize_clusters, ClusterSummary};
use crate::wcss::compute_wcss;

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.0001;
pub const DEFAULT_SEED: u64 = 0;

/// Options for a single k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    /// Upper bound on assign/update rounds.
    pub max_iterations: usize,
    /// A run stops once no centroid moves further than this.
    pub convergence_threshold: f64,
    /// Seed for the run's own random generator.
    pub seed: u64,
    pub initialization: Initialization,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            seed: DEFAULT_SEED,
            initialization: Initialization::Random,
        }
    }
}

impl KMeansConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_convergence_threshold(mut self, convergence_threshold: f64) -> Self {
        self.convergence_threshold = convergence_threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_initialization(mut self, initialization: Initialization) -> Self {
        self.initialization = initialization;
        self
    }
}

/// Why a run stopped iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    MaxIterationsReached,
    /// No data, or fewer points than clusters; nothing was computed.
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster index per input point, in input order.
    pub labels: Vec<usize>,
    /// Final centroids, one row per cluster.
    pub centroids: Array2<f64>,
    /// Number of completed assign/update rounds.
    pub n_iter: usize,
    pub stop_reason: StopReason,
}

impl KMeansResult {
    fn insufficient_data(dim: usize) -> Self {
        Self {
            labels: Vec::new(),
            centroids: Array2::zeros((0, dim)),
            n_iter: 0,
            stop_reason: StopReason::InsufficientData,
        }
    }

    /// Distance of every point to the centroid it was assigned to.
    pub fn distances(&self, data: &Dataset) -> Result<Vec<f64>> {
        if self.labels.len() != data.len() {
            return Err(ClusterError::LabelCountMismatch {
                labels: self.labels.len(),
                points: data.len(),
            });
        }

        let k = self.centroids.nrows();
        data.iter()
            .zip(self.labels.iter())
            .map(|(point, &label)| {
                if label >= k {
                    return Err(ClusterError::LabelOutOfRange { label, k });
                }
                euclidean_distance(point, self.centroids.row(label))
            })
            .collect()
    }

    pub fn wcss(&self, data: &Dataset) -> Result<f64> {
        compute_wcss(data, &self.labels, self.centroids.view())
    }

    /// Clusters ordered by rank, see [`summarize_clusters`].
    pub fn summary(&self, data: &Dataset) -> Result<Vec<ClusterSummary>> {
        summarize_clusters(data, &self.labels, self.centroids.view())
    }
}

fn assign_points(data: &Dataset, centroids: ArrayView2<f64>, labels: &mut [usize]) -> Result<()> {
    for (point, label) in data.iter().zip(labels.iter_mut()) {
        let mut nearest = 0;
        let mut min_distance = f64::INFINITY;

        // strict comparison keeps the lowest index on ties
        for (centroid_idx, centroid) in centroids.rows().into_iter().enumerate() {
            let distance = euclidean_distance(point, centroid)?;
            if distance < min_distance {
                min_distance = distance;
                nearest = centroid_idx;
            }
        }

        *label = nearest;
    }

    Ok(())
}

fn update_centroids(data: &Dataset, labels: &[usize], centroids: &mut Array2<f64>) {
    let k = centroids.nrows();
    let mut sums = vec![Array1::<f64>::zeros(data.dim()); k];
    let mut cluster_sizes = vec![0usize; k];

    for (point, &label) in data.iter().zip(labels.iter()) {
        sums[label].update_centroid(point);
        cluster_sizes[label] += 1;
    }

    for (idx, (mut sum, size)) in sums.into_iter().zip(cluster_sizes).enumerate() {
        if size > 0 {
            sum.finalize_centroid(size);
            centroids.row_mut(idx).assign(&sum);
        } else {
            log::debug!("Cluster {} has no points, keeping its previous centroid", idx);
        }
    }
}

/// Largest distance any centroid travelled between two rounds. A NaN
/// shift wins over every number so an overflowed run never looks settled.
fn calculate_max_shift(centroids: ArrayView2<f64>, prev_centroids: ArrayView2<f64>) -> Result<f64> {
    centroids
        .rows()
        .into_iter()
        .zip(prev_centroids.rows())
        .try_fold(0.0f64, |max_shift, (c1, c2)| {
            let shift = euclidean_distance(c1, c2)?;
            if max_shift.is_nan() || shift.is_nan() {
                return Ok(f64::NAN);
            }
            Ok(max_shift.max(shift))
        })
}

/// Lloyd's k-means: seeded initialization followed by alternating
/// assignment and mean updates until the centroids settle or the
/// iteration cap is hit.
///
/// Returns an empty result when `data` is empty or has fewer than `k`
/// points.
pub fn kmeans(data: &Dataset, k: usize, config: &KMeansConfig) -> Result<KMeansResult> {
    if k == 0 {
        return Err(ClusterError::InvalidClusterCount(k));
    }
    if data.is_empty() || data.len() < k {
        log::debug!("Skipping k-means: {} points for {} clusters", data.len(), k);
        return Ok(KMeansResult::insufficient_data(data.dim()));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut centroids = initialize_centroids(data, k, &config.initialization, &mut rng)?;
    log::info!("Starting k-means with k={} on {} points", k, data.len());

    let mut labels = vec![0usize; data.len()];
    let mut n_iter = 0;
    let mut stop_reason = StopReason::MaxIterationsReached;

    for iter in 0..config.max_iterations {
        if iter > 0 && iter % 10 == 0 {
            log::info!("Finished iteration {}", iter);
        }

        assign_points(data, centroids.view(), &mut labels)?;

        let prev_centroids = centroids.clone();
        update_centroids(data, &labels, &mut centroids);
        n_iter = iter + 1;

        let max_shift = calculate_max_shift(centroids.view(), prev_centroids.view())?;
        log::debug!("Iteration {}: largest centroid shift {}", n_iter, max_shift);

        // NaN compares false, so an overflowed run keeps iterating
        if max_shift <= config.convergence_threshold {
            log::info!("Converged after {} iterations", n_iter);
            stop_reason = StopReason::Converged;
            break;
        }
    }

    if n_iter == 0 {
        assign_points(data, centroids.view(), &mut labels)?;
    }
    if stop_reason == StopReason::MaxIterationsReached {
        log::warn!("Stopped after {} iterations without converging", n_iter);
    }

    Ok(KMeansResult {
        labels,
        centroids,
        n_iter,
        stop_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    fn pairs() -> Dataset {
        Dataset::from_vectors(&[
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 0.0],
            vec![10.0, 1.0],
        ])
        .unwrap()
    }

    fn random_scores(seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Dataset::from_array(Array2::random_using((40, 4), Uniform::new(0.0, 100.0), &mut rng))
    }

    #[test]
    fn test_separates_two_pairs() {
        let config = KMeansConfig::default().with_initialization(Initialization::Centroids(vec![
            vec![0.0, 0.0],
            vec![10.0, 0.0],
        ]));
        let result = kmeans(&pairs(), 2, &config).unwrap();

        assert_eq!(result.labels, vec![0, 0, 1, 1]);
        assert_eq!(result.centroids, array![[0.0, 0.5], [10.0, 0.5]]);
        assert_eq!(result.distances(&pairs()).unwrap(), vec![0.5; 4]);

        let summary = result.summary(&pairs()).unwrap();
        assert_eq!(summary[0].cluster, 1);
        assert_eq!(summary[0].centroid_mean, 5.25);
        assert_eq!(summary[1].share, 50.0);
        assert_eq!(result.stop_reason, StopReason::Converged);
        assert_eq!(result.n_iter, 2);
    }

    #[test]
    fn test_empty_cluster_keeps_its_centroid() {
        let data = Dataset::from_vectors(&[vec![0.0], vec![2.0], vec![8.0], vec![10.0]]).unwrap();
        let config = KMeansConfig::default().with_initialization(Initialization::Centroids(vec![
            vec![-1.5],
            vec![5.0],
            vec![11.5],
        ]));
        let result = kmeans(&data, 3, &config).unwrap();

        // the middle cluster owns {2, 8} after the first round, then loses both
        assert_eq!(result.labels, vec![0, 0, 2, 2]);
        assert_eq!(result.centroids, array![[1.0], [5.0], [9.0]]);
        assert_eq!(result.n_iter, 3);
        assert_eq!(result.stop_reason, StopReason::Converged);
    }

    #[test]
    fn test_single_cluster_is_the_mean() {
        let data = Dataset::from_vectors(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let result = kmeans(&data, 1, &KMeansConfig::default()).unwrap();
        assert_eq!(result.labels, vec![0, 0, 0]);
        assert_eq!(result.centroids, array![[3.0, 4.0]]);
    }

    #[test]
    fn test_labels_are_in_range() {
        let data = random_scores(11);
        for k in 1..=6 {
            let result = kmeans(&data, k, &KMeansConfig::default()).unwrap();
            assert_eq!(result.labels.len(), data.len());
            assert_eq!(result.centroids.nrows(), k);
            assert!(result.labels.iter().all(|&label| label < k));
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let data = random_scores(3);
        let config = KMeansConfig::default().with_seed(42);
        let first = kmeans(&data, 4, &config).unwrap();
        let second = kmeans(&data, 4, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_points_go_to_nearest_centroid() {
        let data = random_scores(5);
        let result = kmeans(&data, 3, &KMeansConfig::default()).unwrap();
        if result.stop_reason != StopReason::Converged {
            return;
        }

        for (point, &label) in data.iter().zip(result.labels.iter()) {
            let assigned = euclidean_distance(point, result.centroids.row(label)).unwrap();
            for centroid in result.centroids.rows() {
                assert!(assigned <= euclidean_distance(point, centroid).unwrap() + 1e-3);
            }
        }
    }

    #[test]
    fn test_insufficient_data_returns_empty() {
        let data = Dataset::from_vectors(&[vec![1.0, 1.0]]).unwrap();
        let result = kmeans(&data, 2, &KMeansConfig::default()).unwrap();
        assert!(result.labels.is_empty());
        assert_eq!(result.centroids.nrows(), 0);
        assert_eq!(result.stop_reason, StopReason::InsufficientData);

        let empty: Vec<Vec<f64>> = vec![];
        let result = kmeans(&Dataset::from_vectors(&empty).unwrap(), 1, &KMeansConfig::default()).unwrap();
        assert!(result.labels.is_empty());
    }

    #[test]
    fn test_zero_clusters_is_rejected() {
        assert_eq!(
            kmeans(&pairs(), 0, &KMeansConfig::default()),
            Err(ClusterError::InvalidClusterCount(0))
        );
    }

    #[test]
    fn test_nan_shift_is_not_convergence() {
        let centroids = array![[0.0], [f64::NAN], [2.0]];
        let prev_centroids = array![[0.0], [1.0], [2.0]];
        let shift = calculate_max_shift(centroids.view(), prev_centroids.view()).unwrap();
        assert!(shift.is_nan());

        let centroids = array![[f64::NAN], [3.0]];
        let prev_centroids = array![[1.0], [0.0]];
        assert!(calculate_max_shift(centroids.view(), prev_centroids.view()).unwrap().is_nan());
    }

    #[test]
    fn test_overflowing_centroids_never_converge() {
        // the mean of two 1e308 values overflows to inf, then inf - inf is NaN
        let data = Dataset::from_vectors(&[vec![1e308], vec![1e308]]).unwrap();
        let result = kmeans(&data, 1, &KMeansConfig::default().with_max_iterations(5)).unwrap();
        assert_eq!(result.stop_reason, StopReason::MaxIterationsReached);
        assert_eq!(result.n_iter, 5);
    }

    #[test]
    fn test_iteration_cap() {
        let config = KMeansConfig::default()
            .with_max_iterations(1)
            .with_initialization(Initialization::Centroids(vec![vec![0.0, 0.0], vec![10.0, 0.0]]));
        let result = kmeans(&pairs(), 2, &config).unwrap();
        assert_eq!(result.n_iter, 1);
        assert_eq!(result.stop_reason, StopReason::MaxIterationsReached);
        assert_eq!(result.labels, vec![0, 0, 1, 1]);

        let result = kmeans(&pairs(), 2, &config.with_max_iterations(0)).unwrap();
        assert_eq!(result.n_iter, 0);
        assert_eq!(result.labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_every_point_its_own_cluster() {
        let data = Dataset::from_vectors(&[vec![0.0], vec![1.0], vec![10.0]]).unwrap();
        let result = kmeans(&data, 3, &KMeansConfig::default()).unwrap();
        assert_eq!(result.wcss(&data), Ok(0.0));
    }
}
