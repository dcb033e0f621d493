//! Stock Heatmap - price series viewer and correlation heatmap library
//!
//! Fetches per-ticker price history from a remote provider and turns it into
//! per-ticker statistics and a pairwise Pearson correlation matrix.
//!
//! # Modules
//!
//! - `domain`: Core types and pure math (Series, TickerStats, CorrelationMatrix, Tier)
//! - `ports`: Trait abstractions (MarketDataPort, CredentialProvider)
//! - `application`: CorrelationEngine and the stale-response guarded HeatmapSession
//! - `adapters`: External implementations (provider HTTP client, CLI)
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod ports;
pub mod application;
pub mod adapters;
pub mod config;
