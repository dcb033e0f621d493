//! Descriptive Statistics
//!
//! Mean and sample standard deviation of a price series.
//!
//! Standard deviation uses the unbiased (n - 1) estimator so it cancels
//! cleanly against the covariance normalisation used for correlation.
//!
//! Series with fewer than two samples have no defined standard deviation.
//! They report `std_dev = 0.0` and are flagged degenerate, as are flat
//! series whose deviation is numerically zero.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::series::Series;

/// Standard deviation, relative to the mean's magnitude, at or below which a
/// series is treated as flat. Scale-free, so sub-cent prices keep their variance.
pub const MIN_RELATIVE_STD_DEV: f64 = 1e-12;

/// Mean and sample standard deviation of one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerStats {
    pub mean: f64,
    pub std_dev: f64,
    /// Number of samples the stats were computed from
    pub samples: usize,
}

impl TickerStats {
    /// Compute stats for a raw price slice
    pub fn describe(prices: &[f64]) -> Self {
        let samples = prices.len();

        match samples {
            0 => Self { mean: 0.0, std_dev: 0.0, samples },
            1 => Self { mean: prices[0], std_dev: 0.0, samples },
            _ => Self {
                mean: prices.iter().mean(),
                std_dev: prices.iter().std_dev(),
                samples,
            },
        }
    }

    /// Compute stats for a series
    pub fn from_series(series: &Series) -> Self {
        Self::describe(&series.prices())
    }

    /// Too few samples or zero variance; correlation against it is undefined
    pub fn is_degenerate(&self) -> bool {
        self.samples < 2 || !(self.std_dev > MIN_RELATIVE_STD_DEV * self.mean.abs())
    }
}
