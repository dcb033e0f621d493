//! Domain Layer - Core types and pure computation
//!
//! This module contains pure domain types and math with no I/O.
//! All provider interactions happen through the ports layer.
//!
//! - `ticker`: Ticker identifiers and provider listings
//! - `series`: Price samples, series ordering, look-back windows
//! - `stats`: Mean and sample standard deviation
//! - `correlation`: Series alignment, Pearson correlation, matrix assembly
//! - `tier`: Bucketing of correlation values for the heatmap

pub mod ticker;
pub mod series;
pub mod stats;
pub mod correlation;
pub mod tier;

pub use ticker::{Ticker, TickerListing, dedup_tickers};
pub use series::{PriceSample, Series, Window, SUPPORTED_WINDOWS, DEFAULT_WINDOW_MINUTES};
pub use stats::{TickerStats, MIN_RELATIVE_STD_DEV};
pub use correlation::{Alignment, CorrelationMatrix, CorrelationReport, align, pearson, TIMESTAMP_TOLERANCE_MS};
pub use tier::Tier;
