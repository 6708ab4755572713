// Continuous ingestor: polls every query each round and appends rows to the live table.
// Each round is an error boundary; the task only ends on shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use crate::models::IngestStatsSnapshot;
use crate::prometheus::PrometheusClient;
use crate::table::TableSink;

/// Counters shared between the ingestor and readers.
#[derive(Debug, Default)]
pub struct IngestStats {
    rounds_completed: AtomicU64,
    rows_appended: AtomicU64,
    fetch_failures: AtomicU64,
    rejected_samples: AtomicU64,
    sink_failures: AtomicU64,
}

impl IngestStats {
    pub fn snapshot(&self) -> IngestStatsSnapshot {
        IngestStatsSnapshot {
            rounds_completed: self.rounds_completed.load(Ordering::Relaxed),
            rows_appended: self.rows_appended.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            rejected_samples: self.rejected_samples.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

/// Client, sink, counters and shutdown for the ingestor.
pub struct WorkerDeps {
    pub client: PrometheusClient,
    pub sink: Arc<dyn TableSink>,
    pub stats: Arc<IngestStats>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Ingestor timing and query set.
pub struct WorkerConfig {
    pub queries: Vec<String>,
    /// Sleep after each round.
    pub interval_ms: u64,
    /// How often to log ingest stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// What one round did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub rows_appended: u64,
    pub failed_queries: u64,
    pub rejected_samples: u64,
}

/// Spawns the ingestor. It runs until `shutdown_rx` fires (or its sender is dropped),
/// checked while sleeping between rounds.
pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        client,
        sink,
        stats,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        queries,
        interval_ms,
        stats_log_interval_secs,
    } = config;

    let interval = Duration::from_millis(interval_ms);
    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);
    let span = tracing::span!(tracing::Level::DEBUG, "ingestor", interval_ms);

    tokio::spawn(
        async move {
            let mut round: u64 = 0;
            let mut last_stats_log = Instant::now();

            loop {
                round += 1;
                let summary = run_round(&client, sink.as_ref(), &stats, &queries, round).await;
                stats.rounds_completed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    round,
                    rows_appended = summary.rows_appended,
                    failed_queries = summary.failed_queries,
                    "round complete"
                );

                if last_stats_log.elapsed() >= stats_log_interval {
                    let s = stats.snapshot();
                    tracing::info!(
                        rounds_completed = s.rounds_completed,
                        rows_appended = s.rows_appended,
                        fetch_failures = s.fetch_failures,
                        rejected_samples = s.rejected_samples,
                        sink_failures = s.sink_failures,
                        "ingest stats"
                    );
                    last_stats_log = Instant::now();
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut shutdown_rx => {
                        tracing::debug!(round, "Ingestor shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(span),
    )
}

/// Runs one round over `queries`, appending each sample as soon as its query returns.
/// A failed query is logged and skipped; the rest of the round still runs.
pub async fn run_round(
    client: &PrometheusClient,
    sink: &dyn TableSink,
    stats: &IngestStats,
    queries: &[String],
    round: u64,
) -> RoundSummary {
    let mut summary = RoundSummary::default();

    for query in queries {
        let result = match client.fetch(query).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    query = %query,
                    round,
                    error_kind = e.kind(),
                    error = %e,
                    operation = "fetch",
                    "query failed; skipping for this round"
                );
                summary.failed_queries += 1;
                stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };

        for rejected in &result.rejected {
            tracing::warn!(
                query = %query,
                round,
                error = %rejected,
                operation = "parse_sample",
                "sample skipped"
            );
        }
        let rejected = result.rejected.len() as u64;
        summary.rejected_samples += rejected;
        stats.rejected_samples.fetch_add(rejected, Ordering::Relaxed);

        for sample in result.samples {
            if let Err(e) = sink.append_row(sample) {
                tracing::warn!(
                    query = %query,
                    round,
                    error = %e,
                    operation = "append_row",
                    "live table write failed; dropping remaining rows for query"
                );
                stats.sink_failures.fetch_add(1, Ordering::Relaxed);
                break;
            }
            summary.rows_appended += 1;
            stats.rows_appended.fetch_add(1, Ordering::Relaxed);
        }
    }

    summary
}
