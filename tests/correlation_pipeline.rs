//! Correlation Pipeline Integration Tests
//!
//! Integration tests that drive the whole fetch-then-compute pipeline:
//! 1. StaticMarketData -> CorrelationEngine -> CorrelationReport
//! 2. CorrelationReport -> Tier classification and rendering
//! 3. HeatmapSession latest-wins publication
//!
//! All tests are deterministic (no real network calls) and use fixture data.

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};

use stock_heatmap::adapters::cli::render::render_heatmap;
use stock_heatmap::application::{CorrelationEngine, EngineConfig, HeatmapSession};
use stock_heatmap::domain::{Alignment, PriceSample, Series, Ticker, Tier};
use stock_heatmap::ports::{AccessToken, StaticMarketData};

// ============================================================================
// Test Fixtures
// ============================================================================

/// One sample per minute starting at 04:00 UTC
fn minute_series(prices: &[f64]) -> Series {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PriceSample::new(Utc.with_ymd_and_hms(2025, 5, 8, 4, i as u32, 0).unwrap(), p))
        .collect()
}

fn engine_with(market: StaticMarketData) -> CorrelationEngine {
    CorrelationEngine::new(Arc::new(market), EngineConfig::default())
}

fn token() -> AccessToken {
    AccessToken::new("integration-token")
}

fn tickers(symbols: &[&str]) -> Vec<Ticker> {
    symbols.iter().map(|s| Ticker::from(*s)).collect()
}

/// Five tickers with assorted relationships, one of them flat
fn market_of_five() -> StaticMarketData {
    StaticMarketData::new()
        .with_series("NVDA", minute_series(&[100.0, 102.0, 101.0, 105.0, 107.0, 106.0]))
        .with_series("AMD", minute_series(&[50.0, 51.5, 50.2, 53.0, 54.1, 53.3]))
        .with_series("TSLA", minute_series(&[200.0, 195.0, 199.0, 190.0, 186.0, 188.0]))
        .with_series("GOOGL", minute_series(&[150.0, 151.0, 149.0, 150.5, 149.5, 150.0]))
        .with_series("FLAT", minute_series(&[42.0, 42.0, 42.0, 42.0, 42.0, 42.0]))
}

// ============================================================================
// Engine Pipeline
// ============================================================================

#[tokio::test]
async fn test_scaled_series_correlate_perfectly() {
    let market = StaticMarketData::new()
        .with_series("A", minute_series(&[10.0, 12.0, 14.0, 16.0]))
        .with_series("B", minute_series(&[20.0, 24.0, 28.0, 32.0]));
    let engine = engine_with(market);

    let report = engine.compute_matrix(&token(), &tickers(&["A", "B"]), 10).await;

    let a = Ticker::from("A");
    let b = Ticker::from("B");
    assert_relative_eq!(report.correlation(&a, &b).unwrap(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(report.stats_for(&a).unwrap().mean, 13.0, epsilon = 1e-9);
    assert_relative_eq!(report.stats_for(&a).unwrap().std_dev, 2.581988897, epsilon = 1e-6);
}

#[tokio::test]
async fn test_inverse_series_correlate_negatively() {
    let market = StaticMarketData::new()
        .with_series("A", minute_series(&[10.0, 20.0, 10.0, 20.0]))
        .with_series("B", minute_series(&[20.0, 10.0, 20.0, 10.0]));
    let engine = engine_with(market);

    let report = engine.compute_matrix(&token(), &tickers(&["A", "B"]), 10).await;

    let value = report.correlation(&Ticker::from("A"), &Ticker::from("B")).unwrap();
    assert_relative_eq!(value, -1.0, epsilon = 1e-9);
    assert_eq!(Tier::classify(value), Tier::StrongNegative);
}

#[tokio::test]
async fn test_empty_ticker_list_yields_empty_report() {
    let market = market_of_five();
    let engine = engine_with(market.clone());

    let report = engine.compute_matrix(&token(), &[], 50).await;

    assert!(report.is_empty());
    assert!(report.matrix.is_empty());
    assert!(report.stats.is_empty());
    assert!(market.get_calls().is_empty());
}

#[tokio::test]
async fn test_failed_ticker_degrades_without_disturbing_others() {
    let market = StaticMarketData::new()
        .with_series("A", minute_series(&[10.0, 12.0, 14.0, 16.0]))
        .with_failure("DOWN")
        .with_series("B", minute_series(&[20.0, 24.0, 28.0, 32.0]));
    let engine = engine_with(market);

    let report = engine.compute_matrix(&token(), &tickers(&["A", "DOWN", "B"]), 30).await;

    assert_eq!(report.matrix.len(), 3);
    let down = report.index_of(&Ticker::from("DOWN")).unwrap();
    for j in 0..3 {
        assert!(report.matrix.get(down, j).is_none());
        assert_eq!(report.matrix.tier(down, j), Tier::Neutral);
        assert_eq!(report.matrix.value_or_neutral(down, j), 0.0);
    }
    assert_eq!(report.stats_for(&Ticker::from("DOWN")).unwrap().samples, 0);

    let value = report.correlation(&Ticker::from("A"), &Ticker::from("B")).unwrap();
    assert_relative_eq!(value, 1.0, epsilon = 1e-9);

    let text = render_heatmap(&report, 30);
    assert!(text.contains("n/a ="));
}

#[tokio::test]
async fn test_matrix_properties_hold() {
    let engine = engine_with(market_of_five());
    let symbols = tickers(&["NVDA", "AMD", "TSLA", "GOOGL", "FLAT"]);

    let report = engine.compute_matrix(&token(), &symbols, 50).await;
    let n = report.matrix.len();
    assert_eq!(n, 5);

    for i in 0..n {
        for j in 0..n {
            assert_eq!(report.matrix.get(i, j), report.matrix.get(j, i));
            if let Some(value) = report.matrix.get(i, j) {
                assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&value));
            }
        }
    }

    for ticker in &report.tickers {
        let stats = report.stats_for(ticker).unwrap();
        assert!(stats.std_dev >= 0.0);
        let i = report.index_of(ticker).unwrap();
        if stats.std_dev > 0.0 {
            assert_relative_eq!(report.matrix.get(i, i).unwrap(), 1.0, epsilon = 1e-9);
        }
    }

    // Flat prices have no defined correlation
    let flat = report.index_of(&Ticker::from("FLAT")).unwrap();
    assert!(report.matrix.get(flat, 0).is_none());

    let nvda_amd = report.correlation(&Ticker::from("NVDA"), &Ticker::from("AMD")).unwrap();
    let nvda_tsla = report.correlation(&Ticker::from("NVDA"), &Ticker::from("TSLA")).unwrap();
    assert!(nvda_amd > 0.7);
    assert!(nvda_tsla < -0.7);
}

#[tokio::test]
async fn test_recomputation_is_idempotent() {
    let engine = engine_with(market_of_five());
    let symbols = tickers(&["NVDA", "AMD", "TSLA"]);

    let first = engine.compute_matrix(&token(), &symbols, 50).await;
    let second = engine.compute_matrix(&token(), &symbols, 50).await;

    assert_eq!(first.matrix, second.matrix);
    assert_eq!(first.tickers, second.tickers);
}

#[tokio::test]
async fn test_uneven_sample_counts_pair_by_timestamp() {
    // B is missing its first two minutes
    let a = minute_series(&[10.0, 99.0, 12.0, 14.0, 16.0]);
    let b: Series = minute_series(&[0.0, 0.0, 24.0, 28.0, 32.0])
        .samples()
        .iter()
        .skip(2)
        .cloned()
        .collect();
    let market = StaticMarketData::new().with_series("A", a).with_series("B", b);

    let by_time = CorrelationEngine::new(Arc::new(market.clone()), EngineConfig::default());
    let report = by_time.compute_matrix(&token(), &tickers(&["A", "B"]), 10).await;
    let value = report.correlation(&Ticker::from("A"), &Ticker::from("B")).unwrap();
    assert_relative_eq!(value, 1.0, epsilon = 1e-9);

    let by_tail = CorrelationEngine::new(
        Arc::new(market),
        EngineConfig::default().with_alignment(Alignment::Tail),
    );
    let report = by_tail.compute_matrix(&token(), &tickers(&["A", "B"]), 10).await;
    let value = report.correlation(&Ticker::from("A"), &Ticker::from("B")).unwrap();
    assert_relative_eq!(value, 1.0, epsilon = 1e-9);
}

#[tokio::test]
async fn test_credential_threaded_to_every_fetch() {
    let market = market_of_five();
    let engine = engine_with(market.clone());

    engine
        .compute_matrix(&token(), &tickers(&["NVDA", "AMD", "TSLA"]), 60)
        .await;

    let seen = market.tokens_seen();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|t| t == "integration-token"));
    assert!(market.get_calls().iter().all(|(_, minutes)| *minutes == 60));
}

// ============================================================================
// Heatmap Session
// ============================================================================

#[tokio::test]
async fn test_session_keeps_latest_request() {
    let market = market_of_five().with_delay("NVDA", Duration::from_millis(200));
    let session = HeatmapSession::new(engine_with(market));

    let slow = session.refresh(token(), tickers(&["NVDA", "AMD"]), 50).await;
    let fast = session.refresh(token(), tickers(&["AMD", "TSLA"]), 10).await;
    session.settle().await;

    assert!(fast > slow);
    let latest = session.latest().unwrap();
    assert_eq!(latest.generation, fast);
    assert_eq!(latest.window_minutes, 10);
    assert_eq!(latest.report.tickers, tickers(&["AMD", "TSLA"]));
}

#[tokio::test]
async fn test_session_subscribers_see_published_snapshot() {
    let session = HeatmapSession::new(engine_with(market_of_five()));
    let mut updates = session.subscribe();

    let snapshot = session
        .request(&token(), &tickers(&["NVDA", "GOOGL"]), 30)
        .await
        .unwrap();

    updates.changed().await.unwrap();
    let seen = updates.borrow().clone().unwrap();
    assert_eq!(seen.generation, snapshot.generation);
    assert_eq!(seen.report.tickers, tickers(&["NVDA", "GOOGL"]));
}
