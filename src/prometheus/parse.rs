// Typed parse step for /api/v1/query responses.
// Shape mismatches mean "no data"; per-element defects become SampleError.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::{FetchError, QueryResult, SampleError};
use crate::models::MetricSample;

const VECTOR_RESULT_TYPE: &str = "vector";
const JOB_LABEL: &str = "job";
const INSTANCE_LABEL: &str = "instance";

/// One element of `data.result` for an instant vector.
#[derive(Debug, Deserialize)]
struct VectorElement {
    #[serde(default)]
    metric: HashMap<String, String>,
    value: (f64, String),
}

/// Parses a response body for `query`. Only invalid JSON is an error.
pub fn parse_response(query: &str, body: &[u8]) -> Result<QueryResult, FetchError> {
    let envelope: Value = serde_json::from_slice(body)?;

    let Some(data) = envelope.get("data") else {
        return Ok(QueryResult::default());
    };
    if data.get("resultType").and_then(Value::as_str) != Some(VECTOR_RESULT_TYPE) {
        return Ok(QueryResult::default());
    }
    let Some(elements) = data.get("result").and_then(Value::as_array) else {
        return Ok(QueryResult::default());
    };

    let mut result = QueryResult::default();
    for (index, element) in elements.iter().enumerate() {
        match parse_element(query, index, element) {
            Ok(sample) => result.samples.push(sample),
            Err(e) => result.rejected.push(e),
        }
    }
    Ok(result)
}

fn parse_element(query: &str, index: usize, element: &Value) -> Result<MetricSample, SampleError> {
    let VectorElement { mut metric, value } =
        VectorElement::deserialize(element).map_err(|e| SampleError::Malformed {
            index,
            reason: e.to_string(),
        })?;
    let (seconds, raw_value) = value;

    let timestamp =
        timestamp_from_seconds(seconds).ok_or(SampleError::TimestampOutOfRange { index, seconds })?;
    let job = metric.remove(JOB_LABEL).ok_or(SampleError::MissingLabel {
        index,
        label: JOB_LABEL,
    })?;
    let instance = metric
        .remove(INSTANCE_LABEL)
        .ok_or(SampleError::MissingLabel {
            index,
            label: INSTANCE_LABEL,
        })?;
    let Some(value) = parse_sample_value(&raw_value) else {
        return Err(SampleError::InvalidValue {
            index,
            raw: raw_value,
        });
    };

    Ok(MetricSample {
        timestamp,
        query: query.to_string(),
        job,
        instance,
        value,
    })
}

/// Epoch seconds to a timestamp, truncated to whole milliseconds.
pub fn timestamp_from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).trunc();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Prometheus sample values are strings; "NaN", "+Inf" and "-Inf" included.
fn parse_sample_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
