//! Terminal rendering for CLI output
//!
//! Plain-text and JSON views of tickers, a single price history and the
//! correlation heatmap.

use std::fmt::Write;

use chrono::Local;
use serde::Serialize;

use crate::application::PriceSummary;
use crate::domain::{CorrelationReport, Ticker, TickerListing, TickerStats, Tier};

const CELL_WIDTH: usize = 10;

fn tier_code(tier: Tier) -> &'static str {
    match tier {
        Tier::StrongPositive => "++",
        Tier::Positive => "+",
        Tier::Neutral => "=",
        Tier::Negative => "-",
        Tier::StrongNegative => "--",
    }
}

/// Provider catalogue, one ticker per line
pub fn render_tickers(listings: &[TickerListing]) -> String {
    let width = listings.iter().map(|l| l.ticker.as_str().len()).max().unwrap_or(0);
    let mut out = String::new();

    for listing in listings {
        let _ = writeln!(out, "{:<width$}  {}", listing.ticker.as_str(), listing.name, width = width);
    }

    out
}

/// Colour legend, strongest positive first
pub fn render_legend() -> String {
    let mut out = String::from("Correlation Legend\n");

    for tier in Tier::ALL {
        let _ = writeln!(
            out,
            "  {:<3} {:<16} {:<12} {}",
            tier_code(tier),
            tier.label(),
            tier.range_text(),
            tier.color_hex()
        );
    }

    out
}

/// One ticker's samples followed by its summary statistics
pub fn render_price_summary(summary: &PriceSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - last {} minutes", summary.ticker, summary.window_minutes);

    if summary.series.is_empty() {
        out.push_str("No price data available\n");
        return out;
    }

    for sample in summary.series.samples() {
        let local = sample.timestamp.with_timezone(&Local);
        let _ = writeln!(out, "  {}  ${:.2}", local.format("%H:%M:%S"), sample.price);
    }

    let _ = writeln!(out, "Average Price: ${:.2}", summary.stats.mean);
    let _ = writeln!(out, "Std Dev:       ${:.2}", summary.stats.std_dev);
    if let (Some(min), Some(max)) = (summary.series.min_price(), summary.series.max_price()) {
        let _ = writeln!(out, "Range:         ${:.2} - ${:.2}", min, max);
    }
    let _ = writeln!(out, "Samples:       {}", summary.series.len());

    out
}

fn format_cell(value: Option<f64>, tier: Tier) -> String {
    match value {
        Some(v) => format!("{:+.2} {}", v, tier_code(tier)),
        None => format!("n/a {}", tier_code(tier)),
    }
}

/// Matrix with tier codes, then per-ticker mean and standard deviation
pub fn render_heatmap(report: &CorrelationReport, window_minutes: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Correlation Heatmap - last {} minutes", window_minutes);

    if report.is_empty() {
        out.push_str("No tickers to compare\n");
        return out;
    }

    let label_width = report
        .tickers
        .iter()
        .map(|t| t.as_str().len())
        .max()
        .unwrap_or(0)
        .max("Stock".len());

    let _ = write!(out, "{:<label_width$}", "Stock", label_width = label_width);
    for ticker in &report.tickers {
        let _ = write!(out, " {:>CELL_WIDTH$}", ticker.as_str());
    }
    out.push('\n');

    for (i, row_ticker) in report.tickers.iter().enumerate() {
        let _ = write!(out, "{:<label_width$}", row_ticker.as_str(), label_width = label_width);
        for j in 0..report.tickers.len() {
            let cell = format_cell(report.matrix.get(i, j), report.matrix.tier(i, j));
            let _ = write!(out, " {:>CELL_WIDTH$}", cell);
        }
        out.push('\n');
    }

    out.push('\n');
    for ticker in &report.tickers {
        let (mean, std_dev) = report
            .stats_for(ticker)
            .map(|s| (s.mean, s.std_dev))
            .unwrap_or((0.0, 0.0));
        let _ = writeln!(
            out,
            "{:<label_width$}  Avg: ${:.2}  Std Dev: ${:.2}",
            ticker.as_str(),
            mean,
            std_dev,
            label_width = label_width
        );
    }

    out
}

/// One heatmap cell for JSON output
#[derive(Debug, Serialize)]
pub struct CellView {
    pub value: Option<f64>,
    pub tier: Tier,
    pub color: &'static str,
}

/// JSON shape of a heatmap
#[derive(Debug, Serialize)]
pub struct HeatmapView<'a> {
    pub window_minutes: u32,
    pub tickers: &'a [Ticker],
    pub matrix: Vec<Vec<CellView>>,
    pub stats: Vec<(&'a Ticker, Option<&'a TickerStats>)>,
}

impl<'a> HeatmapView<'a> {
    pub fn new(report: &'a CorrelationReport, window_minutes: u32) -> Self {
        let n = report.tickers.len();
        let matrix = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let tier = report.matrix.tier(i, j);
                        CellView {
                            value: report.matrix.get(i, j),
                            tier,
                            color: tier.color_hex(),
                        }
                    })
                    .collect()
            })
            .collect();

        let stats = report.tickers.iter().map(|t| (t, report.stats_for(t))).collect();

        Self {
            window_minutes,
            tickers: &report.tickers,
            matrix,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Alignment, PriceSample, Series};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn report_for(entries: &[(&str, &[f64])]) -> CorrelationReport {
        let tickers: Vec<Ticker> = entries.iter().map(|(t, _)| Ticker::from(*t)).collect();
        let series: HashMap<Ticker, Series> = entries
            .iter()
            .map(|(t, prices)| {
                let series = prices
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| {
                        PriceSample::new(Utc.with_ymd_and_hms(2025, 5, 8, 4, i as u32, 0).unwrap(), p)
                    })
                    .collect();
                (Ticker::from(*t), series)
            })
            .collect();
        CorrelationReport::from_series(&tickers, &series, Alignment::Timestamp)
    }

    #[test]
    fn test_legend_lists_every_tier() {
        let legend = render_legend();
        for tier in Tier::ALL {
            assert!(legend.contains(tier.label()));
            assert!(legend.contains(tier.color_hex()));
        }
    }

    #[test]
    fn test_heatmap_text() {
        let report = report_for(&[
            ("A", &[10.0, 20.0, 10.0, 20.0]),
            ("B", &[20.0, 10.0, 20.0, 10.0]),
            ("DOWN", &[]),
        ]);

        let text = render_heatmap(&report, 30);

        assert!(text.contains("last 30 minutes"));
        assert!(text.contains("-1.00 --"));
        assert!(text.contains("+1.00 ++"));
        assert!(text.contains("n/a ="));
        assert!(text.contains("A      Avg: $15.00"));
    }

    #[test]
    fn test_empty_heatmap_text() {
        let text = render_heatmap(&CorrelationReport::empty(), 50);
        assert!(text.contains("No tickers to compare"));
    }

    #[test]
    fn test_heatmap_json_shape() {
        let report = report_for(&[("A", &[1.0, 2.0, 3.0]), ("FLAT", &[4.0, 4.0, 4.0])]);

        let json = serde_json::to_value(HeatmapView::new(&report, 10)).unwrap();

        assert_eq!(json["window_minutes"], 10);
        assert_eq!(json["tickers"][1], "FLAT");
        assert_eq!(json["matrix"][0][0]["value"], 1.0);
        assert_eq!(json["matrix"][0][0]["tier"], "strong-positive");
        assert!(json["matrix"][0][1]["value"].is_null());
        assert_eq!(json["matrix"][0][1]["tier"], "neutral");
        assert_eq!(json["matrix"][0][1]["color"], "#ffffbf");
    }

    #[test]
    fn test_tickers_listing() {
        let text = render_tickers(&[
            TickerListing::new("Apple Inc.", "AAPL"),
            TickerListing::new("Meta Platforms, Inc.", "META"),
        ]);
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("AAPL  Apple Inc."));
    }
}
