use std::sync::{RwLock, RwLockReadGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use super::{SinkError, TableSink};
use crate::models::MetricSample;

/// Append-only, unbounded table. Appended rows are also broadcast to subscribers.
pub struct LiveTable {
    rows: RwLock<Vec<MetricSample>>,
    closed: AtomicBool,
    tx: broadcast::Sender<MetricSample>,
}

impl LiveTable {
    /// `broadcast_capacity` bounds how far a subscriber may lag before skipping rows.
    pub fn new(broadcast_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(broadcast_capacity);
        Self {
            rows: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
            tx,
        }
    }

    pub fn len(&self) -> usize {
        self.read_rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every row, in insertion order.
    pub fn rows(&self) -> Vec<MetricSample> {
        self.read_rows().clone()
    }

    /// Last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> Vec<MetricSample> {
        let rows = self.read_rows();
        rows[rows.len().saturating_sub(n)..].to_vec()
    }

    /// Readers keep seeing committed rows even if a writer panicked mid-append.
    fn read_rows(&self) -> RwLockReadGuard<'_, Vec<MetricSample>> {
        self.rows.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Receives rows appended after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<MetricSample> {
        self.tx.subscribe()
    }

    /// Stops accepting rows. Existing rows stay readable.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl TableSink for LiveTable {
    fn append_row(&self, sample: MetricSample) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed);
        }
        {
            let mut rows = self.rows.write().map_err(|_| SinkError::Poisoned)?;
            rows.push(sample.clone());
        }
        // No subscribers is fine
        let _ = self.tx.send(sample);
        Ok(())
    }
}
