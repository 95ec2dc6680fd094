// src/reference.rs
//! Static reference data: the fund universe, fund families, domain keywords
//! and the activist roster. Loaded once at process start, read-only for the
//! lifetime of a run, shared by reference across adapters and the classifier.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_REFERENCE_CONFIG_PATH: &str = "REFERENCE_CONFIG_PATH";
pub const DEFAULT_REFERENCE_CONFIG_PATH: &str = "config/reference.toml";

/// Compiled-in copy of the default reference table; used when no config file
/// is present so the service can boot in a bare environment.
const BUILTIN_TOML: &str = include_str!("../config/reference.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct FundEntry {
    pub name: String,   // full legal name
    pub ticker: String, // primary exchange ticker
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivistFirm {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub priority: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceData {
    pub funds: Vec<FundEntry>,
    pub fund_families: Vec<String>,
    pub keywords: Vec<String>,
    pub activists: Vec<ActivistFirm>,
}

impl ReferenceData {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let data: ReferenceData = toml::from_str(s).context("parsing reference data TOML")?;
        if data.funds.is_empty() {
            return Err(anyhow!("reference data: empty fund universe"));
        }
        Ok(data)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading reference data from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolution order:
    /// 1) $REFERENCE_CONFIG_PATH (error when it points nowhere)
    /// 2) config/reference.toml
    /// 3) compiled-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_REFERENCE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::from_path(&pb);
            }
            return Err(anyhow!("REFERENCE_CONFIG_PATH points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_REFERENCE_CONFIG_PATH);
        if default_p.exists() {
            return Self::from_path(&default_p);
        }
        Self::from_toml_str(BUILTIN_TOML)
    }

    /// Compiled-in default universe (infallible: validated by tests).
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_TOML).expect("built-in reference data")
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.funds.iter().map(|f| f.ticker.as_str())
    }

    pub fn ticker_for(&self, fund_name: &str) -> Option<&str> {
        self.funds
            .iter()
            .find(|f| f.name == fund_name)
            .map(|f| f.ticker.as_str())
    }

    pub fn priority_activist(&self) -> Option<&ActivistFirm> {
        self.activists.iter().find(|a| a.priority)
    }
}
