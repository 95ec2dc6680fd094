// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};

use crate::classify::Classifier;
use crate::dedup;
use crate::ingest::types::{Article, RawCandidate, SourceAdapter};
use crate::rank;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_raw_total", "Raw candidates collected from adapters.");
        describe_counter!(
            "news_normalize_dropped_total",
            "Candidates dropped during normalization (missing URL or repeated id)."
        );
        describe_counter!(
            "news_dedup_dropped_total",
            "Articles removed as near-duplicates."
        );
        describe_counter!("news_kept_total", "Articles surviving the acceptance gate.");
        describe_counter!("news_adapter_errors_total", "Adapter fetch/parse errors.");
        describe_gauge!(
            "news_pipeline_last_run_ts",
            "Unix ts when the news pipeline last ran."
        );
    });
}

/// Normalize text pulled out of feeds and pages: decode HTML entities, strip
/// tags, collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 2000 chars
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }
    out
}

/// Content-derived identity: the same source URL + title always hashes to the
/// same id, which gives us early same-source dedup for free.
pub fn article_id(url: &str, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(24);
    for b in digest.iter().take(12) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Turn a raw candidate into an article skeleton. Returns `None` when the
/// record has no resolvable URL or its id was already seen in this run.
pub fn normalize(raw: RawCandidate, seen_ids: &mut HashSet<String>) -> Option<Article> {
    if raw.url.trim().is_empty() {
        return None;
    }
    let id = article_id(&raw.url, &raw.title);
    if !seen_ids.insert(id.clone()) {
        return None;
    }
    Some(Article::skeleton(
        id,
        raw.title,
        raw.summary,
        raw.content,
        raw.url,
        raw.source,
        raw.published_at.to_rfc3339(),
    ))
}

/// Run the whole batch once: fetch from every adapter in the given (fixed)
/// order, normalize, deduplicate, classify, rank. Adapter failures are
/// absorbed per source; an all-empty result is not an error.
pub async fn run_once(adapters: &[Box<dyn SourceAdapter>], classifier: &Classifier) -> Vec<Article> {
    ensure_metrics_described();

    let mut raw: Vec<RawCandidate> = Vec::new();
    for adapter in adapters {
        match adapter.fetch().await {
            Ok(mut batch) => {
                counter!("news_raw_total").increment(batch.len() as u64);
                raw.append(&mut batch);
            }
            Err(e) => {
                tracing::warn!(error = ?e, adapter = adapter.name(), "adapter error");
                counter!("news_adapter_errors_total").increment(1);
            }
        }
    }
    let raw_count = raw.len();

    // Per-run identity cache, reset here on purpose: dedup is not guaranteed
    // across runs.
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut normalized: Vec<Article> = Vec::with_capacity(raw.len());
    let mut normalize_dropped = 0usize;
    for candidate in raw {
        match normalize(candidate, &mut seen_ids) {
            Some(article) => normalized.push(article),
            None => normalize_dropped += 1,
        }
    }

    let before_dedup = normalized.len();
    let unique = dedup::dedup_articles(normalized);
    let dedup_dropped = before_dedup - unique.len();

    let mut classified: Vec<Article> = Vec::with_capacity(unique.len());
    for mut article in unique {
        let body = if article.content.is_empty() {
            article.summary.clone()
        } else {
            article.content.clone()
        };
        let outcome = classifier.classify(&article.title, &body);
        article.category = outcome.category;
        article.relevance_score = outcome.relevance;
        article.priority_score = outcome.relevance * 5.0;
        article.sentiment_score = outcome.sentiment;
        article.tickers = outcome.tickers;
        article.fund_names = outcome.fund_names;
        article.activist_mentions = outcome.activist_mentions;
        classified.push(article);
    }

    let ranked = rank::rank_and_filter(classified);

    counter!("news_normalize_dropped_total").increment(normalize_dropped as u64);
    counter!("news_dedup_dropped_total").increment(dedup_dropped as u64);
    counter!("news_kept_total").increment(ranked.len() as u64);
    gauge!("news_pipeline_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    tracing::info!(
        target: "news",
        raw = raw_count,
        normalize_dropped,
        dedup_dropped,
        returned = ranked.len(),
        "news run complete"
    );

    ranked
}
