use anyhow::Result;
use promfeed::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let client = prometheus::PrometheusClient::from_config(&app_config.prometheus)?;
    tracing::info!(
        endpoint = %client.endpoint(),
        queries = app_config.prometheus.queries.len(),
        "Polling Prometheus"
    );

    let tables = pipeline::Tables::new(app_config.server.live_broadcast_capacity);
    let app = routes::app(
        tables.live.clone(),
        tables.snapshot.clone(),
        tables.ingest_stats.clone(),
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let (server_done_tx, server_done_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let result = axum::serve(listener, app).await;
        let _ = server_done_tx.send(());
        result
    });

    pipeline::run(&app_config, client, &tables, async {
        tokio::select! {
            _ = shutdown_signal() => tracing::info!("Received shutdown signal"),
            _ = server_done_rx => tracing::warn!("HTTP server stopped"),
        }
    })
    .await;

    if server.is_finished() {
        server.await??;
    } else {
        server.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
