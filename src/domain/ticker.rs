use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a tradable instrument (e.g. "NVDA")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<String> for Ticker {
    fn from(symbol: String) -> Self {
        Self(symbol)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A ticker paired with its display name, as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerListing {
    pub name: String,
    pub ticker: Ticker,
}

impl TickerListing {
    pub fn new(name: impl Into<String>, ticker: impl Into<Ticker>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// Collapse repeated tickers, keeping the first occurrence and the caller's order
pub fn dedup_tickers(tickers: &[Ticker]) -> Vec<Ticker> {
    let mut seen = std::collections::HashSet::with_capacity(tickers.len());
    tickers
        .iter()
        .filter(|t| seen.insert(*t))
        .cloned()
        .collect()
}
