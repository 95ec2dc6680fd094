// src/dedup.rs
//! Cross-source near-duplicate collapse. Articles are fingerprinted as sets
//! of lowercase, punctuation-stripped word tokens over `title + summary`;
//! Jaccard similarity above the threshold against any already-accepted
//! article drops the newcomer (first-seen wins). O(n^2) comparisons,
//! acceptable at tens-to-hundreds of articles per run.

use std::collections::HashSet;

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::types::Article;

pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Lowercase word-token set with punctuation stripped.
pub fn token_fingerprint(text: &str) -> HashSet<String> {
    static RE_PUNCT: OnceCell<Regex> = OnceCell::new();
    let re = RE_PUNCT.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation regex"));
    let lowered = text.to_lowercase();
    let cleaned = re.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// |A ∩ B| / |A ∪ B|; 0.0 when both sets are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let inter = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    inter as f64 / union as f64
}

/// Keep the first occurrence of each story; drop later articles whose
/// fingerprint is more than `SIMILARITY_THRESHOLD`-similar to any survivor.
/// Articles with an empty fingerprint carry no comparable text and are
/// dropped outright.
pub fn dedup_articles(articles: Vec<Article>) -> Vec<Article> {
    let mut kept: Vec<Article> = Vec::with_capacity(articles.len());
    let mut fingerprints: Vec<HashSet<String>> = Vec::with_capacity(articles.len());

    for art in articles {
        let fp = token_fingerprint(&format!("{} {}", art.title, art.summary));
        if fp.is_empty() {
            continue;
        }
        let duplicate = fingerprints
            .iter()
            .any(|existing| jaccard(&fp, existing) > SIMILARITY_THRESHOLD);
        if duplicate {
            continue;
        }
        fingerprints.push(fp);
        kept.push(art);
    }
    kept
}
