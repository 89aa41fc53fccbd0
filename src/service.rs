//! Request handling for the clustering and elbow requests.
//!
//! Handlers take a raw JSON body and always produce a [`ServiceResponse`]:
//! a status code plus a JSON body, ready for whichever transport sits on top.

use itertools::{izip, Itertools};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::algorithm::{kmeans, KMeansConfig};
use crate::dataset::Dataset;
use crate::elbow::{elbow_sweep, WcssReport, DEFAULT_MAX_K};
use crate::error::ClusterError;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Caller-supplied point identifier, passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PointId {
    Number(serde_json::Number),
    String(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabeledPoint {
    pub id: PointId,
    pub vector: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringRequest {
    pub data: Vec<LabeledPoint>,
    pub n_clusters: usize,
}

/// Elbow input points; any `id` is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlabeledPoint {
    pub vector: Vec<f64>,
}

fn default_max_k() -> usize {
    DEFAULT_MAX_K
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElbowRequest {
    pub data: Vec<UnlabeledPoint>,
    #[serde(default = "default_max_k")]
    pub max_k: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PointAssignment {
    pub id: PointId,
    pub cluster: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Value,
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(#[source] ClusterError),
}

impl ServiceError {
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => STATUS_BAD_REQUEST,
            ServiceError::Internal(_) => STATUS_INTERNAL_ERROR,
        }
    }
}

impl From<ClusterError> for ServiceError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::DimensionMismatch { .. }
            | ClusterError::NonFiniteValue { .. }
            | ClusterError::InvalidClusterCount(_) => {
                ServiceError::Validation(err.to_string())
            }
            other => ServiceError::Internal(other),
        }
    }
}

fn parse_request<T: DeserializeOwned>(body: &[u8], required: &[&str]) -> Result<T, ServiceError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::Validation(format!("Invalid request: body is not valid JSON ({})", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| ServiceError::Validation("Invalid request: expected a JSON object".to_string()))?;
    if let Some(missing) = required.iter().find(|key| !object.contains_key(**key)) {
        return Err(ServiceError::Validation(format!(
            "Invalid request: key `{}` not found",
            missing
        )));
    }

    serde_json::from_value(value).map_err(|e| ServiceError::Validation(format!("Invalid request: {}", e)))
}

fn internal_error() -> ServiceResponse {
    ServiceResponse {
        status: STATUS_INTERNAL_ERROR,
        body: json!({ "error": "Internal server error" }),
    }
}

/// Payloads are plain structs of numbers and strings, and serde_json writes
/// non-finite floats as `null`, so encoding does not fail in practice.
fn respond<T: Serialize>(endpoint: &str, result: Result<T, ServiceError>) -> ServiceResponse {
    let err = match result {
        Ok(payload) => {
            return match serde_json::to_value(payload) {
                Ok(body) => ServiceResponse {
                    status: STATUS_OK,
                    body,
                },
                Err(e) => {
                    log::error!("Failed to encode /{} response: {}", endpoint, e);
                    internal_error()
                }
            }
        }
        Err(err) => err,
    };

    match &err {
        ServiceError::Validation(reason) => log::warn!("Rejected /{} request: {}", endpoint, reason),
        ServiceError::Internal(cause) => log::error!("Error in /{}: {}", endpoint, cause),
    }

    ServiceResponse {
        status: err.status(),
        body: json!({ "error": err.to_string() }),
    }
}

pub fn run_clustering(request: ClusteringRequest, config: &KMeansConfig) -> Result<Vec<PointAssignment>, ServiceError> {
    if request.data.is_empty() {
        return Err(ServiceError::Validation("Data list is empty".to_string()));
    }
    if request.data.len() < request.n_clusters {
        return Err(ServiceError::Validation(format!(
            "Number of data points ({}) cannot be less than the number of clusters ({})",
            request.data.len(),
            request.n_clusters
        )));
    }

    let (ids, vectors): (Vec<PointId>, Vec<Vec<f64>>) =
        request.data.into_iter().map(|point| (point.id, point.vector)).unzip();
    let dataset = Dataset::from_vectors(&vectors)?;

    let result = kmeans(&dataset, request.n_clusters, config)?;
    let distances = result.distances(&dataset)?;
    for cluster in result.summary(&dataset)? {
        log::info!(
            "Cluster {} (rank {}, {:?}): {} points ({:.1}%), centroid mean {:.2}",
            cluster.cluster,
            cluster.rank,
            cluster.tier,
            cluster.size,
            cluster.share,
            cluster.centroid_mean
        );
    }

    Ok(izip!(ids, result.labels, distances)
        .map(|(id, cluster, distance)| PointAssignment { id, cluster, distance })
        .collect_vec())
}

pub fn run_elbow(request: ElbowRequest, config: &KMeansConfig) -> Result<WcssReport, ServiceError> {
    if request.data.is_empty() {
        return Err(ServiceError::Validation("Data list is empty".to_string()));
    }

    let vectors = request.data.into_iter().map(|point| point.vector).collect_vec();
    let dataset = Dataset::from_vectors(&vectors)?;

    Ok(elbow_sweep(&dataset, request.max_k, config)?)
}

/// Clusters `data` into `n_clusters` groups and reports each point's
/// cluster and distance to its centroid, in input order.
pub fn handle_clustering(body: &[u8], config: &KMeansConfig) -> ServiceResponse {
    let result = parse_request::<ClusteringRequest>(body, &["data", "n_clusters"])
        .and_then(|request| run_clustering(request, config));
    respond("clustering", result)
}

/// WCSS for `k = 1..=max_k`, capped at the number of points.
pub fn handle_elbow(body: &[u8], config: &KMeansConfig) -> ServiceResponse {
    let result = parse_request::<ElbowRequest>(body, &["data"]).and_then(|request| run_elbow(request, config));
    respond("elbow", result)
}
