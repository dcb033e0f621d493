//! Stock API Adapter
//!
//! Implementation of `MarketDataPort` and `CredentialProvider` for the
//! remote price provider's REST API.

mod client;
mod types;

pub use client::{StockApiClient, StockApiConfig, RetryDecision, retry_decision};
pub use types::{AuthRequest, AuthResponse, PricePoint, PriceHistoryResponse, StocksResponse};
