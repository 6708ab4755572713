use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub prometheus: PrometheusConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Max number of appended rows buffered for each /ws/live client (slow clients may lag).
    #[serde(default = "default_live_broadcast_capacity")]
    pub live_broadcast_capacity: usize,
}

fn default_live_broadcast_capacity() -> usize {
    1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    /// Server root, e.g. "http://prometheus:9090".
    pub base_url: String,
    #[serde(default = "default_query_path")]
    pub query_path: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Instant queries evaluated each round, in this order.
    pub queries: Vec<String>,
}

fn default_query_path() -> String {
    "/api/v1/query".into()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

impl PrometheusConfig {
    /// Full instant-query endpoint: base_url followed by query_path.
    pub fn endpoint(&self) -> anyhow::Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let path = self.query_path.trim_start_matches('/');
        let url = Url::parse(&format!("{}/{}", base, path))?;
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Sleep between rounds of the continuous ingestor.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// How often to log ingestion stats at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

fn default_rounds() -> u32 {
    2
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.server.live_broadcast_capacity > 0,
            "server.live_broadcast_capacity must be > 0, got {}",
            self.server.live_broadcast_capacity
        );
        let endpoint = self
            .prometheus
            .endpoint()
            .map_err(|e| anyhow::anyhow!("prometheus.base_url is not a valid URL: {}", e))?;
        anyhow::ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            "prometheus.base_url must use http or https, got {}",
            endpoint.scheme()
        );
        anyhow::ensure!(
            self.prometheus.request_timeout_ms > 0,
            "prometheus.request_timeout_ms must be > 0, got {}",
            self.prometheus.request_timeout_ms
        );
        anyhow::ensure!(
            !self.prometheus.queries.is_empty(),
            "prometheus.queries must contain at least one query"
        );
        if let Some(i) = self
            .prometheus
            .queries
            .iter()
            .position(|q| q.trim().is_empty())
        {
            anyhow::bail!("prometheus.queries[{}] must be non-empty", i);
        }
        anyhow::ensure!(
            self.ingest.interval_ms > 0,
            "ingest.interval_ms must be > 0, got {}",
            self.ingest.interval_ms
        );
        anyhow::ensure!(
            self.ingest.stats_log_interval_secs > 0,
            "ingest.stats_log_interval_secs must be > 0, got {}",
            self.ingest.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.snapshot.rounds > 0,
            "snapshot.rounds must be > 0, got {}",
            self.snapshot.rounds
        );
        anyhow::ensure!(
            self.snapshot.interval_ms > 0,
            "snapshot.interval_ms must be > 0, got {}",
            self.snapshot.interval_ms
        );
        Ok(())
    }
}
