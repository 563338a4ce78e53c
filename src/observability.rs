use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::engine::FilterError;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: filter requests. Labels: outcome.
pub const FILTER_REQUESTS_TOTAL: &str = "weekcap_filter_requests_total";

/// Histogram: end-to-end filter latency in seconds, fetches included.
pub const FILTER_DURATION_SECONDS: &str = "weekcap_filter_duration_seconds";

/// Counter: booking fetches that failed or timed out.
pub const FETCH_FAILURES_TOTAL: &str = "weekcap_fetch_failures_total";

// ── Decision metrics ────────────────────────────────────────────

/// Counter: listings run through the limitation check.
pub const LISTINGS_EVALUATED_TOTAL: &str = "weekcap_listings_evaluated_total";

/// Counter: listings dropped because every week was exhausted.
pub const LISTINGS_HIDDEN_TOTAL: &str = "weekcap_listings_hidden_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a filter result to a short label for metrics.
pub fn outcome_label<T>(result: &Result<T, FilterError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(FilterError::Fetch { .. }) => "fetch_error",
        Err(FilterError::Timeout { .. }) => "timeout",
        Err(FilterError::InvalidRange(_)) => "invalid_range",
    }
}
