//! Correlation Engine
//!
//! Two-phase pipeline behind the heatmap:
//! 1. Fan out one price-history fetch per ticker, concurrently, and collect
//!    the results back in caller order.
//! 2. Hand the completed series map to the pure computation in
//!    `CorrelationReport::from_series`.
//!
//! A failed fetch never aborts the pass. The ticker keeps its row and
//! column, backed by an empty series, and the failure is logged.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::domain::{
    dedup_tickers, Alignment, CorrelationReport, Series, Ticker, TickerListing, TickerStats, Window,
};
use crate::ports::{AccessToken, MarketDataError, MarketDataPort};

/// Engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum provider requests in flight during the fetch phase
    pub fetch_concurrency: usize,
    /// Sample pairing used for every correlation
    pub alignment: Alignment,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 8,
            alignment: Alignment::Timestamp,
        }
    }
}

impl EngineConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// One ticker's price history with its stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSummary {
    pub ticker: Ticker,
    pub window_minutes: u32,
    pub series: Series,
    pub stats: TickerStats,
}

impl PriceSummary {
    /// Average price, `None` when no samples came back
    pub fn average_price(&self) -> Option<f64> {
        (!self.series.is_empty()).then_some(self.stats.mean)
    }
}

/// Orchestrates fetching and correlation for a ticker set
#[derive(Clone)]
pub struct CorrelationEngine {
    market_data: Arc<dyn MarketDataPort>,
    config: EngineConfig,
}

impl CorrelationEngine {
    pub fn new(market_data: Arc<dyn MarketDataPort>, config: EngineConfig) -> Self {
        Self { market_data, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Provider ticker catalogue
    pub async fn list_tickers(&self, credential: &AccessToken)
        -> Result<Vec<TickerListing>, MarketDataError> {
        self.market_data.list_tickers(credential).await
    }

    /// Fetch one series, degrading any provider failure to an empty series
    pub async fn fetch_series(&self, credential: &AccessToken, ticker: &Ticker, window: Window) -> Series {
        match self.market_data.get_series(credential, ticker, window).await {
            Ok(series) => {
                tracing::debug!("Fetched {} samples for {} over {}", series.len(), ticker, window);
                series
            }
            Err(e) => {
                tracing::warn!("Price fetch failed for {} over {}: {} - using empty series", ticker, window, e);
                Series::empty()
            }
        }
    }

    /// Fetch every ticker concurrently. Each fetch fills its own slot.
    pub async fn fetch_all(
        &self,
        credential: &AccessToken,
        tickers: &[Ticker],
        window: Window,
    ) -> HashMap<Ticker, Series> {
        // Each fetch owns its inputs so the pass can run on a spawned task
        let fetches: Vec<_> = tickers
            .iter()
            .cloned()
            .map(|ticker| {
                let engine = self.clone();
                let credential = credential.clone();
                async move {
                    let series = engine.fetch_series(&credential, &ticker, window).await;
                    (ticker, series)
                }
            })
            .collect();

        stream::iter(fetches)
            .buffered(self.config.fetch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Full pass: fetch all series, then compute stats and the matrix.
    ///
    /// An empty ticker list or a zero-minute window yields an empty report
    /// without touching the provider.
    pub async fn compute_matrix(
        &self,
        credential: &AccessToken,
        tickers: &[Ticker],
        window_minutes: u32,
    ) -> CorrelationReport {
        let Some(window) = Window::new(window_minutes) else {
            tracing::debug!("Window of {} minutes requested, returning empty report", window_minutes);
            return CorrelationReport::empty();
        };

        if tickers.is_empty() {
            return CorrelationReport::empty().with_window(window_minutes);
        }

        let tickers = dedup_tickers(tickers);
        let series = self.fetch_all(credential, &tickers, window).await;

        let report = CorrelationReport::from_series(&tickers, &series, self.config.alignment)
            .with_window(window_minutes);
        tracing::info!("Computed {}x{} correlation matrix over {}", tickers.len(), tickers.len(), window);
        report
    }

    /// Price history and stats for one ticker
    pub async fn price_summary(
        &self,
        credential: &AccessToken,
        ticker: &Ticker,
        window_minutes: u32,
    ) -> PriceSummary {
        let series = match Window::new(window_minutes) {
            Some(window) => self.fetch_series(credential, ticker, window).await,
            None => Series::empty(),
        };

        PriceSummary {
            ticker: ticker.clone(),
            window_minutes,
            stats: TickerStats::from_series(&series),
            series,
        }
    }
}
