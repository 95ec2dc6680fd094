// src/classify.rs
//! Rule-based multi-signal classifier. Pure function of (text, reference
//! data): additive signal weights with a final clamp, category heuristics,
//! and matched-entity extraction. No network, trivially unit-testable.

use std::sync::Arc;

use regex::Regex;

use crate::ingest::types::Category;
use crate::reference::ReferenceData;

const FULL_NAME_WEIGHT: f64 = 0.6;
const TICKER_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.1;
const PRIORITY_ACTIVIST_WEIGHT: f64 = 1.0;
const ACTIVIST_WEIGHT: f64 = 0.5;

const ACTIVIST_TERMS: &[&str] = &["activist", "proxy", "tender"];
const DISTRIBUTION_TERMS: &[&str] = &["distribution", "dividend", "yield"];
const CORPORATE_TERMS: &[&str] = &["merger", "liquidation", "conversion"];

/// Outcome of scoring one article's text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub relevance: f64, // [0, 1]
    pub sentiment: f64, // always 0.0, reserved extension point
    pub tickers: Vec<String>,
    pub fund_names: Vec<String>,
    pub activist_mentions: Vec<String>,
}

struct FundMatcher {
    name: String,
    name_lower: String,
    ticker: String,
    // word-boundary match on the lowercased text
    ticker_re: Regex,
}

struct ActivistMatcher {
    name: String,
    needles_lower: Vec<String>, // firm name + aliases
    priority: bool,
}

/// Compiles the reference data once; `classify` is then allocation-light and
/// shareable across requests behind an `Arc`.
pub struct Classifier {
    funds: Vec<FundMatcher>,
    keywords_lower: Vec<String>,
    activists: Vec<ActivistMatcher>,
}

impl Classifier {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        let funds = reference
            .funds
            .iter()
            .map(|f| {
                let pattern = format!(r"\b{}\b", regex::escape(&f.ticker.to_lowercase()));
                FundMatcher {
                    name: f.name.clone(),
                    name_lower: f.name.to_lowercase(),
                    ticker: f.ticker.clone(),
                    ticker_re: Regex::new(&pattern).expect("ticker regex"),
                }
            })
            .collect();

        let keywords_lower = reference
            .keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        let activists = reference
            .activists
            .iter()
            .map(|a| {
                let mut needles_lower = vec![a.name.to_lowercase()];
                needles_lower.extend(a.aliases.iter().map(|s| s.to_lowercase()));
                ActivistMatcher {
                    name: a.name.clone(),
                    needles_lower,
                    priority: a.priority,
                }
            })
            .collect();

        Self {
            funds,
            keywords_lower,
            activists,
        }
    }

    /// Score `title + content` against the fund universe, keyword set and
    /// activist roster. Never panics; empty input yields the default result.
    pub fn classify(&self, title: &str, content: &str) -> Classification {
        let text = format!("{} {}", title, content).to_lowercase();
        if text.trim().is_empty() {
            return Classification::default();
        }

        let mut relevance = 0.0f64;
        let mut tickers: Vec<String> = Vec::new();
        let mut fund_names: Vec<String> = Vec::new();
        let mut activist_mentions: Vec<String> = Vec::new();

        // Full legal fund names (strongest signal).
        for fund in &self.funds {
            if text.contains(&fund.name_lower) {
                relevance += FULL_NAME_WEIGHT;
                push_unique(&mut fund_names, &fund.name);
                push_unique(&mut tickers, &fund.ticker);
            }
        }

        // Ticker symbols on word boundaries, each distinct ticker once.
        for fund in &self.funds {
            if fund.ticker_re.is_match(&text) {
                // "ASA" also appears as the Norwegian company suffix; a Norway
                // mention means the text is about the suffix, not the fund.
                if fund.ticker == "ASA"
                    && (text.contains("norway") || text.contains("norwegian"))
                {
                    continue;
                }
                relevance += TICKER_WEIGHT;
                push_unique(&mut tickers, &fund.ticker);
            }
        }

        // Generic domain keywords: a single flat bump, not per keyword.
        if self.keywords_lower.iter().any(|k| text.contains(k)) {
            relevance += KEYWORD_WEIGHT;
        }

        // Activist firms, matched through name or any alias.
        for firm in &self.activists {
            if firm.needles_lower.iter().any(|n| text.contains(n)) {
                relevance += if firm.priority {
                    PRIORITY_ACTIVIST_WEIGHT
                } else {
                    ACTIVIST_WEIGHT
                };
                push_unique(&mut activist_mentions, &firm.name);
            }
        }

        Classification {
            category: categorize(&text),
            relevance: relevance.min(1.0),
            sentiment: 0.0,
            tickers,
            fund_names,
            activist_mentions,
        }
    }
}

/// First matching rule wins; everything else is `General`.
fn categorize(text: &str) -> Category {
    if contains_any(text, ACTIVIST_TERMS) {
        Category::ActivistActivity
    } else if contains_any(text, DISTRIBUTION_TERMS) {
        Category::Distributions
    } else if contains_any(text, CORPORATE_TERMS) {
        Category::CorporateActions
    } else {
        Category::General
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
