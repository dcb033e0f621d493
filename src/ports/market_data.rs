//! Market Data Port
//!
//! Interface to the remote price provider: the ticker catalogue and
//! per-ticker price history over a look-back window.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Series, Ticker, TickerListing, Window};
use super::auth::AccessToken;

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("REST API error: {0}")]
    RestError(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Market data port trait
///
/// Every call carries the credential explicitly; implementations hold no
/// authentication state of their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// All tickers the provider knows, with display names
    async fn list_tickers(&self, credential: &AccessToken)
        -> Result<Vec<TickerListing>, MarketDataError>;

    /// Price history for one ticker covering the last `window` minutes
    async fn get_series(&self, credential: &AccessToken, ticker: &Ticker, window: Window)
        -> Result<Series, MarketDataError>;
}
