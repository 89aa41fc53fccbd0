use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{ClusterError, Result};

/// Dense `n x d` matrix of input vectors sharing one dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    points: Array2<f64>,
}

impl Dataset {
    /// Builds a dataset from row vectors, rejecting rows whose length differs
    /// from the first one and any NaN or infinite component.
    pub fn from_vectors<V: AsRef<[f64]>>(vectors: &[V]) -> Result<Self> {
        let dim = vectors.first().map_or(0, |v| v.as_ref().len());

        if let Some(bad) = vectors.iter().find(|v| v.as_ref().len() != dim) {
            return Err(ClusterError::DimensionMismatch {
                expected: dim,
                found: bad.as_ref().len(),
            });
        }

        for (point, vector) in vectors.iter().enumerate() {
            if let Some(component) = vector.as_ref().iter().position(|v| !v.is_finite()) {
                return Err(ClusterError::NonFiniteValue { point, component });
            }
        }

        let points = Array2::from_shape_fn((vectors.len(), dim), |(row, col)| {
            vectors[row].as_ref()[col]
        });
        log::debug!("Loaded dataset with {} points of dimension {}", points.nrows(), dim);

        Ok(Self { points })
    }

    pub fn from_array(points: Array2<f64>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> usize {
        self.points.ncols()
    }

    pub fn points(&self) -> ArrayView2<f64> {
        self.points.view()
    }

    pub fn iter(&self) -> impl Iterator<Item = ArrayView1<f64>> {
        self.points.axis_iter(Axis(0))
    }
}
