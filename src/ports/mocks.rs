use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Series, Ticker, TickerListing, Window};
use super::auth::AccessToken;
use super::market_data::{MarketDataError, MarketDataPort};

/// Fixture market data port that records calls and serves canned series
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    listings: Vec<TickerListing>,
    series: HashMap<Ticker, Series>,
    failing: HashSet<Ticker>,
    delays: HashMap<Ticker, Duration>,
    calls: Arc<Mutex<Vec<(Ticker, u32)>>>,
    tokens_seen: Arc<Mutex<Vec<String>>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve a series (and list the ticker) for a symbol
    pub fn with_series(mut self, ticker: &str, series: Series) -> Self {
        let ticker = Ticker::from(ticker);
        self.listings.push(TickerListing::new(format!("{} Inc.", ticker), ticker.clone()));
        self.series.insert(ticker, series);
        self
    }

    /// Builder method to make every fetch for a symbol fail
    pub fn with_failure(mut self, ticker: &str) -> Self {
        let ticker = Ticker::from(ticker);
        self.listings.push(TickerListing::new(format!("{} Inc.", ticker), ticker.clone()));
        self.failing.insert(ticker);
        self
    }

    /// Builder method to delay responses for a symbol
    pub fn with_delay(mut self, ticker: &str, delay: Duration) -> Self {
        self.delays.insert(Ticker::from(ticker), delay);
        self
    }

    /// Get all recorded series calls as (ticker, minutes)
    pub fn get_calls(&self) -> Vec<(Ticker, u32)> {
        self.calls.lock().unwrap().clone()
    }

    /// Get every bearer token the port was called with
    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataPort for StaticMarketData {
    async fn list_tickers(&self, credential: &AccessToken)
        -> Result<Vec<TickerListing>, MarketDataError> {
        self.tokens_seen.lock().unwrap().push(credential.secret().to_string());
        Ok(self.listings.clone())
    }

    async fn get_series(&self, credential: &AccessToken, ticker: &Ticker, window: Window)
        -> Result<Series, MarketDataError> {
        self.tokens_seen.lock().unwrap().push(credential.secret().to_string());
        self.calls.lock().unwrap().push((ticker.clone(), window.minutes()));

        if let Some(delay) = self.delays.get(ticker) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(ticker) {
            return Err(MarketDataError::RestError(format!("simulated outage for {}", ticker)));
        }

        self.series
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_string()))
    }
}
