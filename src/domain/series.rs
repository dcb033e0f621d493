//! Price Series
//!
//! Time-ordered price samples for one ticker and the look-back window
//! they were requested for.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Look-back windows offered by the dashboard, in minutes
pub const SUPPORTED_WINDOWS: [u32; 4] = [10, 30, 50, 60];

/// Window used when the caller does not pick one
pub const DEFAULT_WINDOW_MINUTES: u32 = 50;

/// A single (timestamp, price) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Positive and finite
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Samples for one ticker ordered by ascending timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    samples: Vec<PriceSample>,
}

impl Series {
    /// Build a series, sorting samples by timestamp.
    /// The sort is stable so samples sharing a timestamp keep provider order.
    pub fn new(mut samples: Vec<PriceSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.last()
    }

    pub fn min_price(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.price).reduce(f64::min)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.price).reduce(f64::max)
    }
}

impl FromIterator<PriceSample> for Series {
    fn from_iter<I: IntoIterator<Item = PriceSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Look-back duration in whole minutes (always > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Window(u32);

impl Window {
    /// Returns `None` for a zero-minute window
    pub fn new(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Whether the dashboard offers this window in its selector
    pub fn is_supported(&self) -> bool {
        SUPPORTED_WINDOWS.contains(&self.0)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_MINUTES)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl TryFrom<u32> for Window {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes).ok_or_else(|| "window must be at least one minute".to_string())
    }
}

impl From<Window> for u32 {
    fn from(window: Window) -> Self {
        window.0
    }
}
