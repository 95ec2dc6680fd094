//! CEF news radar — binary entrypoint.
//! Boots the Axum HTTP server: loads reference data and the feed table,
//! builds the adapter roster, wires routes, CORS and the Prometheus exporter.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cef_radar::api::{self, AppState};
use cef_radar::classify::Classifier;
use cef_radar::ingest::{config as feeds_config, providers};
use cef_radar::metrics;
use cef_radar::reference::ReferenceData;

const ENV_PORT: &str = "PORT";
const DEFAULT_PORT: u16 = 8000;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cef_radar=info,news=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let reference = Arc::new(ReferenceData::load_default().context("loading reference data")?);
    let feeds = feeds_config::load_feeds_default().context("loading feed table")?;
    tracing::info!(
        funds = reference.funds.len(),
        activists = reference.activists.len(),
        feeds = feeds.feeds.len(),
        "reference data loaded"
    );

    let adapters = providers::build_adapters(&feeds, &reference);
    let classifier = Arc::new(Classifier::new(reference));

    let cache_ttl = AppState::cache_ttl_from_env();
    let prometheus = metrics::install(cache_ttl.as_secs());

    let state = AppState::new(adapters, classifier, cache_ttl);
    let router = api::create_router(state).merge(metrics::exposition_router(prometheus));

    let port = std::env::var(ENV_PORT)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "cef-radar listening");

    axum::serve(listener, router).await.context("serving HTTP")?;
    Ok(())
}
