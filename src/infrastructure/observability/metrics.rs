//! Prometheus recorder and HTTP request metrics

use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

const REQUESTS_TOTAL: &str = "http_requests_total";
const REQUEST_DURATION: &str = "http_request_duration_seconds";
const SERVER_ERRORS_TOTAL: &str = "http_server_errors_total";

const MAX_PATH_LABEL_CHARS: usize = 50;

/// Handle to the installed recorder, rendered on the metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: PrometheusHandle,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder when metrics are enabled
///
/// Returns `None` when disabled or when a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .inspect_err(|e| tracing::error!(error = %e, "Failed to install Prometheus recorder"))
        .ok()?;

    gauge!("cronos_api_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    tracing::info!(path = %config.path, "Prometheus metrics enabled");

    Some(PrometheusMetrics { handle })
}

/// Router serving the text exposition format at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(render_metrics))
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<PrometheusMetrics>) -> String {
    metrics.render()
}

/// Count one finished request and its latency
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path_label(path)),
        ("status", status.to_string()),
    ];

    counter!(REQUESTS_TOTAL, &labels).increment(1);
    histogram!(REQUEST_DURATION, &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!(SERVER_ERRORS_TOTAL, &labels).increment(1);
    }
}

/// Bound label cardinality: segments holding a digit become `{id}`
fn path_label(path: &str) -> String {
    let label = path
        .split('/')
        .map(|segment| {
            let templated = segment.starts_with('{') && segment.ends_with('}');
            if !templated && segment.chars().any(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    label.chars().take(MAX_PATH_LABEL_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_segments_are_collapsed() {
        assert_eq!(path_label("/users/123"), "/users/{id}");
        assert_eq!(path_label("/users/abc123xyz"), "/users/{id}");
        assert_eq!(path_label("/a/1/2/3"), "/a/{id}/{id}/{id}");
    }

    #[test]
    fn test_route_templates_are_kept() {
        assert_eq!(path_label("/users/{user_id}"), "/users/{user_id}");
        assert_eq!(path_label("/health"), "/health");
    }

    #[test]
    fn test_long_paths_are_truncated() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert_eq!(path_label(path).chars().count(), MAX_PATH_LABEL_CHARS);
    }

    #[test]
    fn test_disabled_config_installs_nothing() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_http_request("GET", "/users", 200, Duration::from_millis(3));
    }
}
