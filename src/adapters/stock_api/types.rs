//! Stock API wire types
//!
//! Request and response bodies of the price provider's REST API.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PriceSample, Series, TickerListing};
use crate::ports::AccessToken;

/// `expires_in` values above this are absolute unix timestamps, not lifetimes
const EPOCH_THRESHOLD_SECS: i64 = 1_000_000_000;

/// Body of `POST /auth`
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

/// Response of `POST /auth`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl AuthResponse {
    pub fn into_token(self, now: DateTime<Utc>) -> AccessToken {
        let token = AccessToken::new(self.access_token);
        match self.expires_in {
            Some(secs) if secs > EPOCH_THRESHOLD_SECS => match Utc.timestamp_opt(secs, 0).single() {
                Some(at) => token.with_expiry(at),
                None => token,
            },
            Some(secs) if secs > 0 => token.with_expiry(now + Duration::seconds(secs)),
            _ => token,
        }
    }
}

/// Response of `GET /stocks`: display name -> ticker
#[derive(Debug, Clone, Deserialize)]
pub struct StocksResponse {
    pub stocks: BTreeMap<String, String>,
}

impl StocksResponse {
    /// Listings ordered by display name
    pub fn into_listings(self) -> Vec<TickerListing> {
        self.stocks
            .into_iter()
            .map(|(name, ticker)| TickerListing::new(name, ticker))
            .collect()
    }
}

/// One price observation on the wire
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    #[serde(rename = "lastUpdatedAt")]
    pub last_updated_at: DateTime<Utc>,
}

/// Response of `GET /stocks/{ticker}`
///
/// With a `minutes` query the provider answers with the history array; it
/// falls back to the latest price wrapped in `stock` otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceHistoryResponse {
    History(Vec<PricePoint>),
    Latest { stock: PricePoint },
}

impl PriceHistoryResponse {
    /// Convert to a series, dropping non-positive or non-finite prices.
    /// Also returns how many points were dropped.
    pub fn into_series(self) -> (Series, usize) {
        let points = match self {
            PriceHistoryResponse::History(points) => points,
            PriceHistoryResponse::Latest { stock } => vec![stock],
        };

        let total = points.len();
        let samples: Vec<PriceSample> = points
            .into_iter()
            .map(|p| PriceSample::new(p.last_updated_at, p.price))
            .filter(PriceSample::is_valid)
            .collect();
        let dropped = total - samples.len();

        (Series::new(samples), dropped)
    }
}
