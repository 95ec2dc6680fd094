// tests/api_cache.rs
//
// Cache behavior for the /news endpoint: a fresh entry is served without
// re-running the pipeline, while /news/refresh always bypasses the cache.
// A counting adapter makes the upstream fetches observable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use cef_radar::api::{create_router, AppState};
use cef_radar::classify::Classifier;
use cef_radar::ingest::types::{RawCandidate, SourceAdapter};
use cef_radar::reference::ReferenceData;

const BODY_LIMIT: usize = 1024 * 1024;

/// Counts how many times the pipeline actually hits the source.
struct CountingAdapter {
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl SourceAdapter for CountingAdapter {
    async fn fetch(&self) -> Result<Vec<RawCandidate>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![RawCandidate {
            source: "wire".to_string(),
            title: "Saba Capital presses for tender offer".to_string(),
            summary: "Board responds".to_string(),
            content: String::new(),
            url: "https://wire.test/saba".to_string(),
            published_at: Utc::now(),
        }])
    }
    fn name(&self) -> &str {
        "wire"
    }
}

fn counting_router(cache_ttl: Duration) -> (Router, Arc<AtomicUsize>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(CountingAdapter {
        fetches: Arc::clone(&fetches),
    })];
    let classifier = Arc::new(Classifier::new(Arc::new(ReferenceData::builtin())));
    let state = AppState::new(adapters, classifier, cache_ttl);
    (create_router(state), fetches)
}

async fn get_news(app: &Router, uri: &str) -> Vec<Json> {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("router response");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let json: Json = serde_json::from_slice(&bytes).expect("json body");
    json.as_array().expect("array of articles").clone()
}

#[tokio::test]
async fn second_news_call_within_ttl_is_served_from_cache() {
    let (app, fetches) = counting_router(Duration::from_secs(300));

    let first = get_news(&app, "/news").await;
    assert_eq!(first.len(), 1);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    let second = get_news(&app, "/news").await;
    assert_eq!(second, first);
    assert_eq!(
        fetches.load(Ordering::SeqCst),
        1,
        "a fresh cache entry must not trigger another upstream fetch"
    );
}

#[tokio::test]
async fn refresh_bypasses_cache_and_repopulates_it() {
    let (app, fetches) = counting_router(Duration::from_secs(300));

    get_news(&app, "/news").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    get_news(&app, "/news/refresh").await;
    assert_eq!(
        fetches.load(Ordering::SeqCst),
        2,
        "/news/refresh must run the pipeline even while the cache is fresh"
    );

    // The refreshed result now serves subsequent /news calls.
    get_news(&app, "/news").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_entry_triggers_a_new_pipeline_run() {
    let (app, fetches) = counting_router(Duration::ZERO);

    get_news(&app, "/news").await;
    get_news(&app, "/news").await;
    assert_eq!(
        fetches.load(Ordering::SeqCst),
        2,
        "a zero TTL expires the entry immediately, so every call refetches"
    );
}
