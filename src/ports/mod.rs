//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data (ticker catalogue, price history)
//! - Credentials (bearer tokens for the provider)

pub mod market_data;
pub mod auth;
pub mod mocks;

pub use market_data::{MarketDataError, MarketDataPort};
pub use auth::{AccessToken, AuthError, CredentialProvider, StaticCredentials};
pub use mocks::StaticMarketData;
