// Process control flow: the continuous ingestor in the background, the snapshot on this task.
// The two paths are independent; a failed snapshot leaves the ingestor running.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::prometheus::PrometheusClient;
use crate::snapshot;
use crate::table::{LiveTable, StaticTable};
use crate::worker::{self, IngestStats, WorkerConfig, WorkerDeps};

/// Tables and counters shared with the read surface.
#[derive(Clone)]
pub struct Tables {
    pub live: Arc<LiveTable>,
    /// Empty until the snapshot collection succeeds.
    pub snapshot: Arc<OnceLock<StaticTable>>,
    pub ingest_stats: Arc<IngestStats>,
}

impl Tables {
    pub fn new(live_broadcast_capacity: usize) -> Self {
        Self {
            live: Arc::new(LiveTable::new(live_broadcast_capacity)),
            snapshot: Arc::new(OnceLock::new()),
            ingest_stats: Arc::new(IngestStats::default()),
        }
    }
}

/// Spawns the ingestor, collects the snapshot table, then waits for `shutdown`.
/// On shutdown the ingestor is stopped and joined, and the live table is closed.
pub async fn run<F>(config: &AppConfig, client: PrometheusClient, tables: &Tables, shutdown: F)
where
    F: Future<Output = ()>,
{
    let (worker_shutdown_tx, worker_shutdown_rx) = oneshot::channel();
    let worker_handle = worker::spawn(
        WorkerDeps {
            client: client.clone(),
            sink: tables.live.clone(),
            stats: tables.ingest_stats.clone(),
            shutdown_rx: worker_shutdown_rx,
        },
        WorkerConfig {
            queries: config.prometheus.queries.clone(),
            interval_ms: config.ingest.interval_ms,
            stats_log_interval_secs: config.ingest.stats_log_interval_secs,
        },
    );

    tokio::pin!(shutdown);

    let collected = tokio::select! {
        result = snapshot::collect(
            &client,
            &config.prometheus.queries,
            config.snapshot.rounds,
            Duration::from_millis(config.snapshot.interval_ms),
        ) => Some(result),
        _ = &mut shutdown => None,
    };

    match collected {
        Some(Ok(table)) => {
            let _ = tables.snapshot.set(table);
            shutdown.await;
        }
        Some(Err(e)) => {
            error!(
                error = %e,
                "snapshot collection failed; serving the live table only"
            );
            shutdown.await;
        }
        None => info!("Shutdown requested during snapshot collection"),
    }

    let _ = worker_shutdown_tx.send(());
    if let Err(e) = worker_handle.await {
        warn!(error = %e, "ingestor task ended abnormally");
    }
    tables.live.close();
    info!(live_rows = tables.live.len(), "Pipeline stopped");
}
