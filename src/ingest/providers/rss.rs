// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::normalize_text;
use crate::ingest::types::{RawCandidate, SourceAdapter};

/// Newest entries taken per feed.
pub const MAX_ITEMS: usize = 20;
/// Courtesy pause before each network fetch; not a retry/backoff knob.
pub const FETCH_PAUSE_SECS: u64 = 2;

const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    updated: Option<String>,
    description: Option<String>,
}

/// Best-effort feed date: candidate fields in priority order, each tried as
/// RFC 2822 then RFC 3339; total failure falls back to fetch time.
fn parse_feed_date(candidates: &[Option<&str>]) -> DateTime<Utc> {
    for raw in candidates.iter().flatten() {
        if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
            if let Some(out) = DateTime::from_timestamp(dt.unix_timestamp(), 0) {
                return out;
            }
        }
        if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
            if let Some(out) = DateTime::from_timestamp(dt.unix_timestamp(), 0) {
                return out;
            }
        }
    }
    Utc::now()
}

/// One syndication feed endpoint from the feed table.
pub struct RssAdapter {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssAdapter {
    pub fn from_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    /// Parse from a captured XML document; used by tests and offline runs.
    pub fn from_fixture(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items(&self, s: &str) -> Result<Vec<RawCandidate>> {
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml for {}", self.name))?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(MAX_ITEMS));
        for it in rss.channel.item.into_iter().take(MAX_ITEMS) {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let url = it.link.unwrap_or_default();
            if title.is_empty() || url.trim().is_empty() {
                continue;
            }
            let summary = normalize_text(it.description.as_deref().unwrap_or_default());
            let published_at =
                parse_feed_date(&[it.pub_date.as_deref(), it.updated.as_deref()]);

            out.push(RawCandidate {
                source: self.name.clone(),
                title,
                content: summary.clone(),
                summary,
                url,
                published_at,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    async fn fetch(&self) -> Result<Vec<RawCandidate>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items(s),
            Mode::Http { url, client } => {
                tokio::time::sleep(std::time::Duration::from_secs(FETCH_PAUSE_SECS)).await;
                let body = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{}: feed GET", self.name))?
                    .text()
                    .await
                    .with_context(|| format!("{}: feed body", self.name))?;
                self.parse_items(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// quick-xml chokes on bare HTML entities inside feed payloads; swap the
/// common ones for plain characters before deserializing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
