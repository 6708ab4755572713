// Config loading and validation tests

use promfeed::config::AppConfig;
use std::io::Write;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[prometheus]
base_url = "http://prometheus:9090"
queries = ["go_memstats_alloc_bytes", "go_memstats_heap_idle_bytes", "go_memstats_frees_total"]

[ingest]
interval_ms = 2000
stats_log_interval_secs = 60

[snapshot]
rounds = 2
interval_ms = 2000
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 8081
host = "127.0.0.1"

[prometheus]
base_url = "http://localhost:9090/"
queries = ["up"]
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.prometheus.queries.len(), 3);
    assert_eq!(config.prometheus.queries[0], "go_memstats_alloc_bytes");
    assert_eq!(config.ingest.interval_ms, 2000);
    assert_eq!(config.snapshot.rounds, 2);
    assert_eq!(
        config.prometheus.endpoint().unwrap().as_str(),
        "http://prometheus:9090/api/v1/query"
    );
}

#[test]
fn test_config_defaults_apply_when_sections_missing() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("load_from_str");
    assert_eq!(config.server.live_broadcast_capacity, 1024);
    assert_eq!(config.prometheus.query_path, "/api/v1/query");
    assert_eq!(config.prometheus.request_timeout_ms, 5000);
    assert_eq!(config.ingest.interval_ms, 2000);
    assert_eq!(config.ingest.stats_log_interval_secs, 60);
    assert_eq!(config.snapshot.rounds, 2);
    assert_eq!(config.snapshot.interval_ms, 2000);
    assert_eq!(
        config.prometheus.endpoint().unwrap().as_str(),
        "http://localhost:9090/api/v1/query"
    );
}

#[test]
fn test_endpoint_keeps_base_path_prefix() {
    let cfg = MINIMAL_CONFIG.replace(
        "base_url = \"http://localhost:9090/\"",
        "base_url = \"https://metrics.example.com/prometheus\"",
    );
    let config = AppConfig::load_from_str(&cfg).unwrap();
    assert_eq!(
        config.prometheus.endpoint().unwrap().as_str(),
        "https://metrics.example.com/prometheus/api/v1/query"
    );
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_queries() {
    let bad = MINIMAL_CONFIG.replace("queries = [\"up\"]", "queries = []");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("prometheus.queries"));
}

#[test]
fn test_config_validation_rejects_blank_query() {
    let bad = MINIMAL_CONFIG.replace("queries = [\"up\"]", "queries = [\"up\", \"  \"]");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("prometheus.queries[1]"));
}

#[test]
fn test_config_validation_rejects_unparseable_base_url() {
    let bad = MINIMAL_CONFIG.replace("http://localhost:9090/", "not a url");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("prometheus.base_url"));
}

#[test]
fn test_config_validation_rejects_non_http_scheme() {
    let bad = MINIMAL_CONFIG.replace("http://localhost:9090/", "ftp://localhost:9090");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("http or https"));
}

#[test]
fn test_config_validation_rejects_ingest_interval_zero() {
    let bad = VALID_CONFIG.replace(
        "[ingest]\ninterval_ms = 2000",
        "[ingest]\ninterval_ms = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("ingest.interval_ms"));
}

#[test]
fn test_config_validation_rejects_snapshot_rounds_zero() {
    let bad = VALID_CONFIG.replace("rounds = 2", "rounds = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("snapshot.rounds"));
}

#[test]
fn test_config_validation_rejects_snapshot_interval_zero() {
    let bad = VALID_CONFIG.replace(
        "rounds = 2\ninterval_ms = 2000",
        "rounds = 2\ninterval_ms = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("snapshot.interval_ms"));
}

#[test]
fn test_config_validation_rejects_request_timeout_zero() {
    let bad = MINIMAL_CONFIG.replace(
        "queries = [\"up\"]",
        "queries = [\"up\"]\nrequest_timeout_ms = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("request_timeout_ms"));
}

#[test]
fn test_config_missing_prometheus_section_fails() {
    let bad = "[server]\nport = 8081\nhost = \"0.0.0.0\"\n";
    assert!(AppConfig::load_from_str(bad).is_err());
}

#[test]
fn test_config_loads_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(VALID_CONFIG.as_bytes()).unwrap();
    let config = AppConfig::load_from_path(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.prometheus.base_url, "http://prometheus:9090");
}

#[test]
fn test_config_missing_file_names_path() {
    let err = AppConfig::load_from_path("/nonexistent/promfeed.toml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/promfeed.toml"));
}
