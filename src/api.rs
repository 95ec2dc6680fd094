// src/api.rs
//! HTTP surface for the presentation layer: the ranked feed as JSON, plus a
//! health probe. The pipeline itself is stateless per invocation; this layer
//! caches the last result for a bounded window so dashboard refreshes do not
//! hammer the upstream sources.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, routing::get, Json, Router};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::classify::Classifier;
use crate::ingest;
use crate::ingest::types::{Article, SourceAdapter};

pub const ENV_NEWS_CACHE_TTL_SECS: &str = "NEWS_CACHE_TTL_SECS";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

struct CacheEntry {
    stored_at: Instant,
    articles: Vec<Article>,
}

#[derive(Clone)]
pub struct AppState {
    adapters: Arc<Vec<Box<dyn SourceAdapter>>>,
    classifier: Arc<Classifier>,
    cache: Arc<Mutex<Option<CacheEntry>>>,
    cache_ttl: Duration,
}

impl AppState {
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        classifier: Arc<Classifier>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            adapters: Arc::new(adapters),
            classifier,
            cache: Arc::new(Mutex::new(None)),
            cache_ttl,
        }
    }

    /// TTL from the environment, with the default on absent/garbage values.
    pub fn cache_ttl_from_env() -> Duration {
        let secs = std::env::var(ENV_NEWS_CACHE_TTL_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        Duration::from_secs(secs)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", get(news))
        .route("/news/refresh", get(news_refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Serve the feed, from cache when fresh enough.
async fn news(State(state): State<AppState>) -> Json<Vec<Article>> {
    {
        let cache = state.cache.lock().await;
        if let Some(entry) = cache.as_ref() {
            if entry.stored_at.elapsed() < state.cache_ttl {
                return Json(entry.articles.clone());
            }
        }
    }
    Json(run_and_store(&state).await)
}

/// Bypass the cache, run the pipeline now, repopulate.
async fn news_refresh(State(state): State<AppState>) -> Json<Vec<Article>> {
    Json(run_and_store(&state).await)
}

async fn run_and_store(state: &AppState) -> Vec<Article> {
    let articles = ingest::run_once(&state.adapters, &state.classifier).await;
    let mut cache = state.cache.lock().await;
    *cache = Some(CacheEntry {
        stored_at: Instant::now(),
        articles: articles.clone(),
    });
    articles
}
