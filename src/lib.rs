pub mod algorithm;
pub mod centroid;
pub mod cli;
pub mod dataset;
pub mod distance;
pub mod elbow;
pub mod error;
pub mod initialization;
pub mod logger;
pub mod service;
pub mod summary;
pub mod wcss;

pub use self::{
    algorithm::kmeans, algorithm::KMeansConfig, algorithm::KMeansResult, algorithm::StopReason,
    dataset::Dataset, distance::euclidean_distance, elbow::elbow_sweep, elbow::WcssPoint,
    elbow::WcssReport, error::ClusterError, initialization::Initialization,
    service::handle_clustering, service::handle_elbow, service::ServiceResponse,
    summary::summarize_clusters, summary::ClusterSummary, summary::Tier,
    wcss::compute_wcss,
};
