// src/metrics.rs
//! Prometheus exporter wiring: install the global recorder, register the
//! service-level static series, expose `/metrics`.

use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the recorder and publish the feed-cache TTL as a static gauge.
/// Call once at boot, before the first pipeline run.
pub fn install(cache_ttl_secs: u64) -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("prometheus: install recorder");

    describe_gauge!(
        "news_cache_ttl_secs",
        "Bounded window for the /news response cache."
    );
    gauge!("news_cache_ttl_secs").set(cache_ttl_secs as f64);

    handle
}

/// Router exposing `/metrics` in the Prometheus exposition format.
pub fn exposition_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}
