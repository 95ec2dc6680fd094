// src/ingest/providers/mod.rs
pub mod newsapi;
pub mod rss;
pub mod scrape;

use std::sync::Arc;

use crate::ingest::config::FeedsConfig;
use crate::ingest::types::SourceAdapter;
use crate::reference::ReferenceData;

/// Build the full adapter roster in its fixed run order: feeds first (table
/// order), then the landing-page scraper, then the search API. The order is
/// load-bearing for dedup survivorship.
pub fn build_adapters(
    feeds: &FeedsConfig,
    reference: &Arc<ReferenceData>,
) -> Vec<Box<dyn SourceAdapter>> {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::with_capacity(feeds.feeds.len() + 2);
    for feed in &feeds.feeds {
        adapters.push(Box::new(rss::RssAdapter::from_url(&feed.name, &feed.url)));
    }
    adapters.push(Box::new(scrape::ScrapeAdapter::from_url(
        "seeking_alpha",
        scrape::CEF_LANDING_URL,
    )));
    adapters.push(Box::new(newsapi::NewsApiAdapter::from_env(reference)));
    adapters
}
