// GET handlers: version, table schema, table rows, ingest stats

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::models::{COLUMNS, TablesInfo};

pub(super) const DEFAULT_TAIL: usize = 20;
pub(super) const MAX_TAIL: usize = 1000;

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/tables — column schema and current row counts.
pub(super) async fn tables_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(TablesInfo {
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        live_rows: state.live.len(),
        static_rows: state.snapshot.get().map(|t| t.len()),
    })
}

/// GET /api/tables/static — every snapshot row; 404 while the snapshot is still being collected.
pub(super) async fn static_table_handler(State(state): State<AppState>) -> Response {
    match state.snapshot.get() {
        Some(table) => Json(table.rows()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "snapshot table not built yet" })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TailParams {
    tail: Option<usize>,
}

/// GET /api/tables/live?tail=N — newest N live rows, oldest first.
pub(super) async fn live_table_handler(
    State(state): State<AppState>,
    Query(params): Query<TailParams>,
) -> impl IntoResponse {
    let n = params.tail.unwrap_or(DEFAULT_TAIL).clamp(1, MAX_TAIL);
    Json(state.live.tail(n))
}

/// GET /api/ingest/stats — continuous ingestor counters.
pub(super) async fn ingest_stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.ingest_stats.snapshot())
}
