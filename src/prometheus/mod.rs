// Prometheus instant-query client: one GET per query, typed response parsing.

mod parse;

pub use parse::{parse_response, timestamp_from_seconds};

use crate::config::PrometheusConfig;
use crate::models::MetricSample;
use reqwest::Url;
use std::time::Duration;
use tracing::instrument;

/// Request-level failure. Never swallowed by the client.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connect, timeout or body read failure
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Body is not valid JSON
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Short error kind for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Decode(_) => "decode",
        }
    }
}

/// A result element that could not become a sample. `index` is its position in `data.result`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("result[{index}]: missing label '{label}'")]
    MissingLabel { index: usize, label: &'static str },

    #[error("result[{index}]: malformed element: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("result[{index}]: invalid sample value {raw:?}")]
    InvalidValue { index: usize, raw: String },

    #[error("result[{index}]: timestamp out of range: {seconds}")]
    TimestampOutOfRange { index: usize, seconds: f64 },
}

/// Samples from one response, in result order, plus the elements that were rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub samples: Vec<MetricSample>,
    pub rejected: Vec<SampleError>,
}

/// Client for one instant-query endpoint. Cheap to clone (shares the connection pool).
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl PrometheusClient {
    /// `endpoint` must include the instant-query path (e.g. `http://host:9090/api/v1/query`).
    pub fn new(endpoint: Url, request_timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &PrometheusConfig) -> anyhow::Result<Self> {
        let client = Self::new(config.endpoint()?, config.request_timeout())?;
        Ok(client)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Evaluates `query` at the current instant.
    #[instrument(skip(self), fields(operation = "fetch"))]
    pub async fn fetch(&self, query: &str) -> Result<QueryResult, FetchError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("query", query)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        let result = parse_response(query, &body)?;
        tracing::trace!(
            samples = result.samples.len(),
            rejected = result.rejected.len(),
            "query evaluated"
        );
        Ok(result)
    }
}
