// src/ingest/providers/newsapi.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;

use crate::ingest::types::{RawCandidate, SourceAdapter};
use crate::reference::ReferenceData;

pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const SOURCE_NAME: &str = "newsapi";

const ENDPOINT: &str = "https://newsapi.org/v2/everything";
/// Trailing window each query covers.
const LOOKBACK_DAYS: i64 = 14;
const PAGE_SIZE: u32 = 30;
/// Courtesy pause between the per-query requests.
pub const QUERY_PAUSE_SECS: u64 = 2;

const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

/// Search-API client. Without a credential it contributes nothing: missing
/// key is a configuration state, not an error.
pub struct NewsApiAdapter {
    api_key: Option<String>,
    queries: Vec<String>,
    client: reqwest::Client,
}

impl NewsApiAdapter {
    /// Credential from the environment, query templates from reference data.
    pub fn from_env(reference: &ReferenceData) -> Self {
        let api_key = std::env::var(ENV_NEWSAPI_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::from_parts(api_key, reference)
    }

    pub fn from_parts(api_key: Option<String>, reference: &ReferenceData) -> Self {
        let tickers: Vec<&str> = reference.tickers().take(10).collect();
        let families: Vec<&str> = reference
            .fund_families
            .iter()
            .map(|s| s.as_str())
            .take(5)
            .collect();
        let queries = vec![
            "\"closed-end fund\" OR \"closed end fund\"".to_string(),
            "CEF discount OR \"premium to NAV\"".to_string(),
            "activist investor fund".to_string(),
            "fund distribution OR dividend".to_string(),
            format!("({})", tickers.join(" OR ")),
            format!("({})", families.join(" OR ")),
        ];
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            queries,
            client,
        }
    }

    async fn run_query(&self, key: &str, query: &str) -> Result<Vec<NewsApiArticle>> {
        let from = (Utc::now() - ChronoDuration::days(LOOKBACK_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        let page_size = PAGE_SIZE.to_string();
        let resp = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("apiKey", key),
            ])
            .send()
            .await
            .context("newsapi GET")?;
        if !resp.status().is_success() {
            anyhow::bail!("newsapi status {}", resp.status());
        }
        let body: NewsApiResponse = resp.json().await.context("newsapi json")?;
        Ok(body.articles)
    }

    fn to_candidate(&self, art: NewsApiArticle) -> Option<RawCandidate> {
        let title = art.title.unwrap_or_default();
        let url = art.url.unwrap_or_default();
        if title.trim().is_empty() || url.trim().is_empty() {
            return None;
        }
        let published_at = art
            .published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        Some(RawCandidate {
            source: SOURCE_NAME.to_string(),
            title,
            summary: art.description.unwrap_or_default(),
            content: art.content.unwrap_or_default(),
            url,
            published_at,
        })
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    async fn fetch(&self) -> Result<Vec<RawCandidate>> {
        // No credential: contribute nothing, make no network call.
        let Some(key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for query in &self.queries {
            tokio::time::sleep(std::time::Duration::from_secs(QUERY_PAUSE_SECS)).await;
            match self.run_query(key, query).await {
                Ok(articles) => {
                    out.extend(articles.into_iter().filter_map(|a| self.to_candidate(a)));
                }
                Err(e) => {
                    // One bad query template must not sink the others.
                    tracing::warn!(error = ?e, query = query.as_str(), "newsapi query failed");
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}
