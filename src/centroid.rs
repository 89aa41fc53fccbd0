use ndarray::{Array1, ArrayView1};
use std::fmt::Debug;

/// Running sum that turns into a cluster mean once every member was added.
pub trait Centroid: Sized + Clone + Debug {
    fn update_centroid(&mut self, data_point: ArrayView1<f64>);
    fn finalize_centroid(&mut self, count: usize);
}

impl Centroid for Array1<f64> {
    fn update_centroid(&mut self, data_point: ArrayView1<f64>) {
        if self.is_empty() {
            *self = Array1::zeros(data_point.len());
        }

        *self += &data_point;
    }

    fn finalize_centroid(&mut self, count: usize) {
        if count > 0 {
            *self /= count as f64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_of_points() {
        let mut centroid: Array1<f64> = Array1::zeros(0);
        centroid.update_centroid(array![1.0, 10.0].view());
        centroid.update_centroid(array![2.0, 20.0].view());
        centroid.update_centroid(array![6.0, 0.0].view());
        centroid.finalize_centroid(3);
        assert_eq!(centroid, array![3.0, 10.0]);
    }

    #[test]
    fn test_finalize_without_members_keeps_sum() {
        let mut centroid = array![4.0, 2.0];
        centroid.finalize_centroid(0);
        assert_eq!(centroid, array![4.0, 2.0]);
    }
}
