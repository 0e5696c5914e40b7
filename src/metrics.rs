use std::sync::OnceLock;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// The recorder is process-global; later calls return the first handle.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE.get_or_init(install).clone()
}

fn install() -> PrometheusHandle {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("A metrics recorder was already installed; /metrics will be empty");
    }

    // Pre-register counters so they appear even before the first increment.
    counter!("trades_created_total").absolute(0);
    counter!("trades_closed_total").absolute(0);
    counter!("trades_deleted_total").absolute(0);
    counter!("write_retries_total").absolute(0);
    counter!("write_failures_total").absolute(0);

    gauge!("ws_clients").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("write_latency_seconds").record(0.0);

    handle
}
