// Table row model and column schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names of both tables, in row order.
pub const COLUMNS: [&str; 5] = ["DateTime", "PrometheusQuery", "Job", "Instance", "Value"];

/// One row: a single instant-vector sample for one query.
/// Serializes with the table column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Sample time reported by the API, millisecond precision.
    #[serde(rename = "DateTime")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "PrometheusQuery")]
    pub query: String,
    #[serde(rename = "Job")]
    pub job: String,
    #[serde(rename = "Instance")]
    pub instance: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Counters published by the continuous ingestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStatsSnapshot {
    pub rounds_completed: u64,
    pub rows_appended: u64,
    pub fetch_failures: u64,
    pub rejected_samples: u64,
    pub sink_failures: u64,
}

/// Schema and row counts of the two tables (GET /api/tables).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesInfo {
    pub columns: Vec<String>,
    pub live_rows: usize,
    /// `None` until the snapshot table is built.
    pub static_rows: Option<usize>,
}
