// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_FEEDS_CONFIG_PATH: &str = "FEEDS_CONFIG_PATH";
pub const DEFAULT_FEEDS_CONFIG_PATH: &str = "config/feeds.toml";

/// Compiled-in feed table; the deployer overrides it with a config file.
const BUILTIN_TOML: &str = include_str!("../../config/feeds.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedEndpoint {
    pub name: String,
    pub url: String,
}

/// Ordered feed table. Order matters: adapters run in this order, which pins
/// dedup survivorship for reproducible runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedsConfig {
    pub feeds: Vec<FeedEndpoint>,
}

/// Load the feed table from an explicit path. Supports TOML or JSON.
pub fn load_feeds_from(path: &Path) -> Result<FeedsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed table from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
}

/// Load the feed table using env var + fallbacks:
/// 1) $FEEDS_CONFIG_PATH
/// 2) config/feeds.toml
/// 3) compiled-in defaults
pub fn load_feeds_default() -> Result<FeedsConfig> {
    if let Ok(p) = std::env::var(ENV_FEEDS_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        }
        return Err(anyhow!("FEEDS_CONFIG_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from(DEFAULT_FEEDS_CONFIG_PATH);
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    parse_toml(BUILTIN_TOML)
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<FeedsConfig> {
    let try_toml = hint_ext == "toml" || s.contains("feeds");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed table format"))
}

fn parse_toml(s: &str) -> Result<FeedsConfig> {
    let cfg: FeedsConfig = toml::from_str(s)?;
    validate(cfg)
}

fn parse_json(s: &str) -> Result<FeedsConfig> {
    // JSON form: a bare array of {name, url} objects.
    let feeds: Vec<FeedEndpoint> = serde_json::from_str(s)?;
    validate(FeedsConfig { feeds })
}

fn validate(cfg: FeedsConfig) -> Result<FeedsConfig> {
    let mut out = Vec::with_capacity(cfg.feeds.len());
    for f in cfg.feeds {
        let name = f.name.trim();
        let url = f.url.trim();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        if out
            .iter()
            .any(|e: &FeedEndpoint| e.name.eq_ignore_ascii_case(name))
        {
            return Err(anyhow!("duplicate feed name: {name}"));
        }
        out.push(FeedEndpoint {
            name: name.to_string(),
            url: url.to_string(),
        });
    }
    Ok(FeedsConfig { feeds: out })
}
