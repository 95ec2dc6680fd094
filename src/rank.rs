// src/rank.rs
//! Final acceptance gate and priority ordering for the classified batch.

use std::cmp::Ordering;

use crate::ingest::types::Article;

/// Minimum relevance for articles with no explicit entity match.
pub const RELEVANCE_FLOOR: f64 = 0.05;

/// An article stays in the feed when it carries either enough relevance or an
/// explicit ticker/activist match.
pub fn accepts(article: &Article) -> bool {
    article.relevance_score > RELEVANCE_FLOOR
        || !article.tickers.is_empty()
        || !article.activist_mentions.is_empty()
}

/// Drop everything below the acceptance gate, then order by priority
/// descending. The sort is stable, so equal priorities keep their original
/// arrival order and output stays deterministic for deterministic input.
pub fn rank_and_filter(mut articles: Vec<Article>) -> Vec<Article> {
    articles.retain(accepts);
    articles.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(Ordering::Equal)
    });
    articles
}
