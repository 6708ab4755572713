use chrono::{DateTime, Utc};

use super::TableError;
use crate::models::MetricSample;

/// Five parallel columns accumulated before building a [`StaticTable`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotColumns {
    pub date_time: Vec<DateTime<Utc>>,
    pub prometheus_query: Vec<String>,
    pub job: Vec<String>,
    pub instance: Vec<String>,
    pub value: Vec<f64>,
}

impl SnapshotColumns {
    pub fn push(&mut self, sample: MetricSample) {
        self.date_time.push(sample.timestamp);
        self.prometheus_query.push(sample.query);
        self.job.push(sample.job);
        self.instance.push(sample.instance);
        self.value.push(sample.value);
    }

    /// Row count, taken from the first column.
    pub fn len(&self) -> usize {
        self.date_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_lengths(&self) -> Result<(), TableError> {
        let expected = self.date_time.len();
        let lengths = [
            ("PrometheusQuery", self.prometheus_query.len()),
            ("Job", self.job.len()),
            ("Instance", self.instance.len()),
            ("Value", self.value.len()),
        ];
        for (column, actual) in lengths {
            if actual != expected {
                return Err(TableError::ColumnLengthMismatch {
                    column,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Immutable table built once from parallel columns.
#[derive(Debug, Clone)]
pub struct StaticTable {
    columns: SnapshotColumns,
}

impl StaticTable {
    pub fn from_columns(columns: SnapshotColumns) -> Result<Self, TableError> {
        columns.check_lengths()?;
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &SnapshotColumns {
        &self.columns
    }

    pub fn rows(&self) -> Vec<MetricSample> {
        let c = &self.columns;
        (0..c.len())
            .map(|i| MetricSample {
                timestamp: c.date_time[i],
                query: c.prometheus_query[i].clone(),
                job: c.job[i].clone(),
                instance: c.instance[i].clone(),
                value: c.value[i],
            })
            .collect()
    }
}
