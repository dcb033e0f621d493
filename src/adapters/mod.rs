//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Stock API: provider REST client and token exchange
//! - CLI: Command-line interface handlers and terminal rendering

pub mod stock_api;
pub mod cli;

pub use stock_api::{StockApiClient, StockApiConfig};
pub use cli::CliApp;
