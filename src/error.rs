use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("Dimension mismatch: expected {expected} components, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Point {point} has a non-finite value at component {component}")]
    NonFiniteValue { point: usize, component: usize },

    #[error("Number of clusters must be at least 1, got {0}")]
    InvalidClusterCount(usize),

    #[error("Invalid initial centroids: {0}")]
    InvalidInitialCentroids(String),

    #[error("Got {labels} labels for {points} data points")]
    LabelCountMismatch { labels: usize, points: usize },

    #[error("Label {label} is out of range for {k} centroids")]
    LabelOutOfRange { label: usize, k: usize },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
