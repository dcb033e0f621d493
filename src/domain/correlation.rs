//! Correlation Matrix
//!
//! Pairwise Pearson correlation between price series.
//!
//! Formula: r = cov(x, y) / (sd_x * sd_y), with both covariance and standard
//! deviations normalised by (n - 1).
//!
//! Two series only correlate over samples they share. `Alignment` decides
//! which samples those are; the result is never computed by indexing past
//! the shorter series. Pairs with fewer than two shared samples, or where
//! either side is flat, have no defined correlation and are stored as `None`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::series::{PriceSample, Series};
use super::stats::TickerStats;
use super::ticker::{dedup_tickers, Ticker};
use super::tier::Tier;

/// Largest gap between two samples still treated as the same instant.
/// Tickers are updated independently, so their timestamps rarely coincide.
pub const TIMESTAMP_TOLERANCE_MS: i64 = 30_000;

/// How two series are paired sample-by-sample before correlating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Pair each sample with the nearest one on the other side, within
    /// `TIMESTAMP_TOLERANCE_MS`; unmatched samples are dropped
    #[default]
    Timestamp,
    /// Truncate both series to the shorter length, keeping the newest samples
    Tail,
}

/// Paired price vectors of equal length for two series
pub fn align(x: &Series, y: &Series, alignment: Alignment) -> (Vec<f64>, Vec<f64>) {
    match alignment {
        Alignment::Timestamp => {
            let (xs, ys) = (x.samples(), y.samples());
            let mut left = Vec::with_capacity(xs.len().min(ys.len()));
            let mut right = Vec::with_capacity(xs.len().min(ys.len()));
            let gap = |a: &PriceSample, b: &PriceSample| {
                (a.timestamp - b.timestamp).num_milliseconds().abs()
            };
            let (mut i, mut j) = (0, 0);

            while i < xs.len() && j < ys.len() {
                // Move on while the next sample on either side is a closer match
                if xs.get(i + 1).is_some_and(|next| gap(next, &ys[j]) < gap(&xs[i], &ys[j])) {
                    i += 1;
                    continue;
                }
                if ys.get(j + 1).is_some_and(|next| gap(&xs[i], next) < gap(&xs[i], &ys[j])) {
                    j += 1;
                    continue;
                }

                if gap(&xs[i], &ys[j]) <= TIMESTAMP_TOLERANCE_MS {
                    left.push(xs[i].price);
                    right.push(ys[j].price);
                    i += 1;
                    j += 1;
                } else if xs[i].timestamp < ys[j].timestamp {
                    i += 1;
                } else {
                    j += 1;
                }
            }

            (left, right)
        }
        Alignment::Tail => {
            let n = x.len().min(y.len());
            let tail = |s: &Series| -> Vec<f64> {
                s.samples()[s.len() - n..].iter().map(|p| p.price).collect()
            };
            (tail(x), tail(y))
        }
    }
}

/// Pearson correlation of two equally long price vectors.
/// Extra trailing values on the longer side are ignored.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);

    let stats_x = TickerStats::describe(x);
    let stats_y = TickerStats::describe(y);
    if stats_x.is_degenerate() || stats_y.is_degenerate() {
        return None;
    }

    let covariance = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - stats_x.mean) * (b - stats_y.mean))
        .sum::<f64>()
        / (n - 1) as f64;

    let r = covariance / (stats_x.std_dev * stats_y.std_dev);

    // Rounding can push a perfect correlation slightly past 1
    Some(r.clamp(-1.0, 1.0))
}

/// N x N correlation values indexed in ticker order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationMatrix {
    rows: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    fn with_size(n: usize) -> Self {
        Self { rows: vec![vec![None; n]; n] }
    }

    /// Number of tickers on each axis
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Correlation at (row, col); `None` when undefined or out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Value used for colouring: undefined cells render as 0.0
    pub fn value_or_neutral(&self, row: usize, col: usize) -> f64 {
        self.get(row, col).unwrap_or(0.0)
    }

    pub fn tier(&self, row: usize, col: usize) -> Tier {
        Tier::classify(self.value_or_neutral(row, col))
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    fn set_pair(&mut self, i: usize, j: usize, value: Option<f64>) {
        self.rows[i][j] = value;
        self.rows[j][i] = value;
    }
}

/// Finished output of one computation pass, in caller ticker order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub tickers: Vec<Ticker>,
    /// Look-back window the series were fetched over; 0 when no pass ran
    pub window_minutes: u32,
    pub matrix: CorrelationMatrix,
    pub stats: HashMap<Ticker, TickerStats>,
}

impl CorrelationReport {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute stats and the full matrix from already fetched series.
    ///
    /// Tickers missing from `series` are treated as empty series. Repeated
    /// tickers are collapsed to their first occurrence.
    pub fn from_series(
        tickers: &[Ticker],
        series: &HashMap<Ticker, Series>,
        alignment: Alignment,
    ) -> Self {
        let tickers = dedup_tickers(tickers);
        let empty = Series::empty();
        let ordered: Vec<&Series> = tickers
            .iter()
            .map(|t| series.get(t).unwrap_or(&empty))
            .collect();

        let stats: HashMap<Ticker, TickerStats> = tickers
            .iter()
            .zip(&ordered)
            .map(|(t, s)| (t.clone(), TickerStats::from_series(s)))
            .collect();

        let n = tickers.len();
        let mut matrix = CorrelationMatrix::with_size(n);

        for i in 0..n {
            let self_defined = !stats[&tickers[i]].is_degenerate();
            matrix.set_pair(i, i, self_defined.then_some(1.0));

            for j in (i + 1)..n {
                let (x, y) = align(ordered[i], ordered[j], alignment);
                let value = pearson(&x, &y);

                if value.is_none() {
                    tracing::debug!(
                        "Correlation {}/{} undefined ({} aligned samples)",
                        tickers[i], tickers[j], x.len()
                    );
                }

                matrix.set_pair(i, j, value);
            }
        }

        Self { tickers, window_minutes: 0, matrix, stats }
    }

    /// Stamp the report with the window its series covered
    pub fn with_window(mut self, window_minutes: u32) -> Self {
        self.window_minutes = window_minutes;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn index_of(&self, ticker: &Ticker) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    pub fn stats_for(&self, ticker: &Ticker) -> Option<&TickerStats> {
        self.stats.get(ticker)
    }

    /// Correlation between two tickers by name
    pub fn correlation(&self, a: &Ticker, b: &Ticker) -> Option<f64> {
        self.matrix.get(self.index_of(a)?, self.index_of(b)?)
    }
}
