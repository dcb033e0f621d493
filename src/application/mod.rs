//! Application Layer - Use cases
//!
//! The correlation engine pipeline and the latest-wins heatmap session.

pub mod correlation_engine;
pub mod heatmap_session;

pub use correlation_engine::{CorrelationEngine, EngineConfig, PriceSummary};
pub use heatmap_session::{HeatmapSession, HeatmapSnapshot};
