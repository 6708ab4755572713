// In-process table store: append-only live table and immutable snapshot table.

mod live;
mod snapshot;

pub use live::LiveTable;
pub use snapshot::{SnapshotColumns, StaticTable};

use crate::models::MetricSample;

/// Append-only row writer. Implementations must not block indefinitely
/// and must report every failed write.
pub trait TableSink: Send + Sync {
    fn append_row(&self, sample: MetricSample) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The table no longer accepts rows.
    #[error("table is closed")]
    Closed,

    /// A writer panicked while holding the row lock.
    #[error("table lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("column {column} has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}
