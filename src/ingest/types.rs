// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw record exactly as a source adapter produced it.
/// Ephemeral: discarded after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub source: String, // e.g., "businesswire_financial"
    pub title: String,
    pub summary: String,
    pub content: String, // may be empty; summary is the fallback
    pub url: String,
    pub published_at: DateTime<Utc>, // fetch time when unparseable
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    General,
    ActivistActivity,
    Distributions,
    CorporateActions,
}

/// Canonical article: the unit of identity, scoring and output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: String, // fingerprint of (url, title)
    pub title: String,
    pub summary: String,
    pub content: String,
    pub url: String,
    pub source: String,
    pub published_at: String, // ISO-8601
    pub category: Category,
    pub relevance_score: f64, // [0, 1]
    pub priority_score: f64,  // relevance_score * 5, ordering only
    pub sentiment_score: f64, // always 0.0, reserved extension point
    pub tickers: Vec<String>,
    pub fund_names: Vec<String>,
    pub activist_mentions: Vec<String>,
}

impl Article {
    /// Skeleton with identity fields set and all scoring fields at rest.
    pub fn skeleton(
        id: String,
        title: String,
        summary: String,
        content: String,
        url: String,
        source: String,
        published_at: String,
    ) -> Self {
        Self {
            id,
            title,
            summary,
            content,
            url,
            source,
            published_at,
            category: Category::General,
            relevance_score: 0.0,
            priority_score: 0.0,
            sentiment_score: 0.0,
            tickers: Vec::new(),
            fund_names: Vec::new(),
            activist_mentions: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch the current batch of raw candidates. An `Err` is absorbed by the
    /// run driver and only affects this source; adapters already tolerate
    /// per-item failures internally.
    async fn fetch(&self) -> Result<Vec<RawCandidate>>;
    fn name(&self) -> &str;
}
