use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!("http_requests_total", "Requests served, labeled by status code");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "Request latency in seconds, labeled by status code"
    );

    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

/// Rendered exposition text, or None when the recorder is not installed.
pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}
