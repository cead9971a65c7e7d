//! Metrics collection and exposition.
//!
//! # Metrics
//! - `connectivity_up` (gauge): 1=connected, 0=disconnected
//! - `connectivity_consecutive_failures` (gauge): current failure streak
//! - `connectivity_transitions_total` (counter): state changes by `to`
//! - `probe_duration_ms` (histogram): elapsed time of successful probes
//! - `probe_results_total` (counter): probe outcomes by `probe`, `outcome`
//!
//! # Design Decisions
//! - Calls go through the `metrics` facade and are no-ops until a recorder
//!   is installed
//! - The Prometheus exporter is only installed when enabled in config

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one probe outcome.
pub fn record_probe(probe: &'static str, success: bool, elapsed_ms: Option<f64>) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("probe_results_total", "probe" => probe, "outcome" => outcome).increment(1);
    if let Some(ms) = elapsed_ms {
        metrics::histogram!("probe_duration_ms", "probe" => probe).record(ms);
    }
}

/// Record the aggregated state after a cycle.
pub fn record_status(connected: bool, consecutive_failures: u32) {
    metrics::gauge!("connectivity_up").set(if connected { 1.0 } else { 0.0 });
    metrics::gauge!("connectivity_consecutive_failures").set(f64::from(consecutive_failures));
}

/// Record a debounced state change.
pub fn record_transition(connected: bool) {
    let to = if connected { "connected" } else { "disconnected" };
    metrics::counter!("connectivity_transitions_total", "to" => to).increment(1);
}
