// HTTP + WebSocket read surface over the live and snapshot tables

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::{Arc, OnceLock};
use tower_http::cors::{Any, CorsLayer};

use crate::table::{LiveTable, StaticTable};
use crate::worker::IngestStats;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) live: Arc<LiveTable>,
    pub(crate) snapshot: Arc<OnceLock<StaticTable>>,
    pub(crate) ingest_stats: Arc<IngestStats>,
}

/// `snapshot` is empty until the snapshot collection finishes; readers get 404 until then.
pub fn app(
    live: Arc<LiveTable>,
    snapshot: Arc<OnceLock<StaticTable>>,
    ingest_stats: Arc<IngestStats>,
) -> Router {
    let state = AppState {
        live,
        snapshot,
        ingest_stats,
    };
    Router::new()
        .route("/", get(|| async { "promfeed: Prometheus live and snapshot tables" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/tables", get(http::tables_handler)) // GET /api/tables
        .route("/api/tables/static", get(http::static_table_handler)) // GET /api/tables/static
        .route("/api/tables/live", get(http::live_table_handler)) // GET /api/tables/live?tail=N
        .route("/api/ingest/stats", get(http::ingest_stats_handler)) // GET /api/ingest/stats
        .route("/ws/live", get(ws::ws_live)) // WS /ws/live
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
