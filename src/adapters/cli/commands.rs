//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the stock heatmap.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::stock_api::{StockApiClient, StockApiConfig};
use crate::application::{CorrelationEngine, EngineConfig, HeatmapSession};
use crate::config::loader::EngineSection;
use crate::config::Config;
use crate::domain::Ticker;
use crate::ports::{AccessToken, CredentialProvider, StaticCredentials};
use super::render::{render_heatmap, render_legend, render_price_summary, render_tickers, HeatmapView};

/// Stock Heatmap - price history and pairwise correlation for a stock provider
#[derive(Parser, Debug)]
#[command(
    name = "stock-heatmap",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Stock price history and correlation heatmap",
    long_about = "Fetches recent price history from the stock provider and shows a single \
                  ticker's prices or the pairwise Pearson correlation heatmap across tickers."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the provider's tickers
    Stocks,

    /// Show price history and average price for one ticker
    Prices(PricesCmd),

    /// Show the correlation heatmap
    Heatmap(HeatmapCmd),

    /// Print the heatmap colour legend
    Legend,
}

impl Command {
    /// Whether the command talks to the provider
    pub fn requires_config(&self) -> bool {
        !matches!(self, Command::Legend)
    }
}

/// Price history for one ticker
#[derive(Parser, Debug)]
pub struct PricesCmd {
    /// Ticker symbol (e.g., NVDA)
    #[arg(value_name = "TICKER")]
    pub ticker: String,

    /// Look-back window in minutes (defaults to the configured window)
    #[arg(short, long, value_name = "MINUTES")]
    pub minutes: Option<u32>,
}

/// Correlation heatmap
#[derive(Parser, Debug)]
pub struct HeatmapCmd {
    /// Look-back window in minutes (defaults to the configured window)
    #[arg(short, long, value_name = "MINUTES")]
    pub minutes: Option<u32>,

    /// Comma separated tickers; all provider tickers when omitted
    #[arg(short, long, value_name = "TICKERS", value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output formats for the heatmap
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Pick the requested window, or the configured default, and check it is offered
pub fn resolve_window(requested: Option<u32>, engine: &EngineSection) -> Result<u32> {
    let minutes = requested.unwrap_or(engine.default_window_minutes);

    if !engine.supported_windows.contains(&minutes) {
        bail!(
            "Unsupported window of {} minutes; choose one of {:?}",
            minutes,
            engine.supported_windows
        );
    }

    Ok(minutes)
}

/// Obtain a bearer token, preferring a pre-issued one from the environment
async fn acquire_token(client: &StockApiClient, config: &Config) -> Result<AccessToken> {
    let provider: Box<dyn CredentialProvider> = match config.auth.get_static_token() {
        Some(token) => {
            tracing::debug!("Using pre-issued access token from environment");
            Box::new(StaticCredentials::new(AccessToken::new(token)))
        }
        None => Box::new(client.clone()),
    };

    provider
        .access_token()
        .await
        .context("Failed to obtain access token")
}

/// Execute a parsed command
pub async fn execute(app: CliApp, config: Option<Config>) -> Result<()> {
    if let Command::Legend = app.command {
        print!("{}", render_legend());
        return Ok(());
    }

    let Some(config) = config else {
        bail!("Configuration is required for this command");
    };

    let client = StockApiClient::new(StockApiConfig::from(&config))
        .context("Failed to create stock API client")?;
    let engine = CorrelationEngine::new(Arc::new(client.clone()), EngineConfig::from(&config));

    match app.command {
        Command::Legend => {}
        Command::Stocks => {
            let token = acquire_token(&client, &config).await?;
            let listings = engine
                .list_tickers(&token)
                .await
                .context("Failed to list tickers")?;
            print!("{}", render_tickers(&listings));
        }
        Command::Prices(cmd) => {
            let minutes = resolve_window(cmd.minutes, &config.engine)?;
            let token = acquire_token(&client, &config).await?;
            let summary = engine
                .price_summary(&token, &Ticker::from(cmd.ticker), minutes)
                .await;
            print!("{}", render_price_summary(&summary));
        }
        Command::Heatmap(cmd) => {
            let minutes = resolve_window(cmd.minutes, &config.engine)?;
            let token = acquire_token(&client, &config).await?;

            let tickers: Vec<Ticker> = if cmd.tickers.is_empty() {
                engine
                    .list_tickers(&token)
                    .await
                    .context("Failed to list tickers")?
                    .into_iter()
                    .map(|l| l.ticker)
                    .collect()
            } else {
                cmd.tickers
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .map(Ticker::from)
                    .collect()
            };

            let session = HeatmapSession::new(engine);
            let snapshot = session
                .request(&token, &tickers, minutes)
                .await
                .context("Heatmap request was superseded")?;

            match cmd.format {
                OutputFormat::Text => {
                    print!("{}", render_legend());
                    println!();
                    print!("{}", render_heatmap(&snapshot.report, snapshot.window_minutes));
                }
                OutputFormat::Json => {
                    let view = HeatmapView::new(&snapshot.report, snapshot.window_minutes);
                    println!("{}", serde_json::to_string_pretty(&view)?);
                }
            }
        }
    }

    Ok(())
}
