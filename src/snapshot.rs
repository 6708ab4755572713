// One-shot snapshot collection: fixed rounds over the query set, then one immutable table.
// Fails fast on the first request-level error.

use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::prometheus::{FetchError, PrometheusClient};
use crate::table::{SnapshotColumns, StaticTable, TableError};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("round {round}, query {query:?}: {source}")]
    Fetch {
        round: u32,
        query: String,
        #[source]
        source: FetchError,
    },

    #[error("building snapshot table: {0}")]
    Table(#[from] TableError),
}

/// Runs `rounds` rounds over `queries` and builds the snapshot table.
/// Rows are in round-major, query-minor order. Sleeps `interval` after every
/// round, the last one included.
#[instrument(skip(client, queries), fields(query_count = queries.len()))]
pub async fn collect(
    client: &PrometheusClient,
    queries: &[String],
    rounds: u32,
    interval: Duration,
) -> Result<StaticTable, SnapshotError> {
    let mut columns = SnapshotColumns::default();

    for round in 1..=rounds {
        for query in queries {
            let result = client
                .fetch(query)
                .await
                .map_err(|source| SnapshotError::Fetch {
                    round,
                    query: query.clone(),
                    source,
                })?;
            for rejected in &result.rejected {
                warn!(
                    query = %query,
                    round,
                    error = %rejected,
                    operation = "snapshot_collect",
                    "sample skipped"
                );
            }
            for sample in result.samples {
                columns.push(sample);
            }
        }
        tokio::time::sleep(interval).await;
    }

    let table = StaticTable::from_columns(columns)?;
    info!(rows = table.len(), "snapshot table built");
    Ok(table)
}
