// Shared test helpers: a fake Prometheus query endpoint served by axum on an ephemeral port

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Router, routing::get};
use promfeed::prometheus::PrometheusClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Arc<dyn Fn(&str, usize) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct FakeState {
    responder: Responder,
    requests: Arc<AtomicUsize>,
    queries_seen: Arc<Mutex<Vec<String>>>,
}

pub struct FakePrometheus {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    queries_seen: Arc<Mutex<Vec<String>>>,
}

impl FakePrometheus {
    /// `responder` gets the decoded query and the 0-based request number across all queries.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str, usize) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let state = FakeState {
            responder: Arc::new(responder),
            requests: Arc::new(AtomicUsize::new(0)),
            queries_seen: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();
        let queries_seen = state.queries_seen.clone();
        let app = Router::new()
            .route("/api/v1/query", get(query_handler))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{}", addr),
            requests,
            queries_seen,
        }
    }

    pub fn endpoint(&self) -> reqwest::Url {
        reqwest::Url::parse(&format!("{}/api/v1/query", self.base_url)).unwrap()
    }

    pub fn client(&self) -> PrometheusClient {
        PrometheusClient::new(self.endpoint(), Duration::from_secs(5)).unwrap()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn queries_seen(&self) -> Vec<String> {
        self.queries_seen.lock().unwrap().clone()
    }
}

async fn query_handler(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let n = state.requests.fetch_add(1, Ordering::SeqCst);
    let query = params.get("query").cloned().unwrap_or_default();
    state.queries_seen.lock().unwrap().push(query.clone());
    (state.responder)(&query, n)
}

/// Instant-vector body; each entry is (job, instance, epoch seconds, value string).
pub fn vector_body(results: &[(&str, &str, f64, &str)]) -> String {
    let result: Vec<serde_json::Value> = results
        .iter()
        .map(|(job, instance, ts, value)| {
            serde_json::json!({
                "metric": { "__name__": "m", "job": job, "instance": instance },
                "value": [ts, value],
            })
        })
        .collect();
    serde_json::json!({
        "status": "success",
        "data": { "resultType": "vector", "result": result },
    })
    .to_string()
}

/// One sample whose value is the request number, so tests can check ordering.
pub fn numbered_body(n: usize) -> String {
    let value = n.to_string();
    vector_body(&[(
        "go",
        "localhost:9090",
        1_700_000_000.0 + n as f64,
        value.as_str(),
    )])
}

pub fn ok(body: String) -> (StatusCode, String) {
    (StatusCode::OK, body)
}

pub fn server_error() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
}
