use ndarray::ArrayView1;

use crate::error::{ClusterError, Result};

fn check_dimensions(us: &ArrayView1<f64>, them: &ArrayView1<f64>) -> Result<()> {
    if us.len() != them.len() {
        return Err(ClusterError::DimensionMismatch {
            expected: us.len(),
            found: them.len(),
        });
    }
    Ok(())
}

/// Sum of squared per-component differences.
pub fn squared_euclidean_distance(us: ArrayView1<f64>, them: ArrayView1<f64>) -> Result<f64> {
    check_dimensions(&us, &them)?;

    Ok(us
        .iter()
        .zip(them.iter())
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff
        })
        .sum::<f64>())
}

/// L2 distance between two vectors of equal length.
pub fn euclidean_distance(us: ArrayView1<f64>, them: ArrayView1<f64>) -> Result<f64> {
    squared_euclidean_distance(us, them).map(f64::sqrt)
}
