//! Stock Heatmap - price series viewer and correlation heatmap
//!
//! Shows a ticker's recent prices or the pairwise correlation heatmap across tickers.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use stock_heatmap::adapters::cli;
use stock_heatmap::config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (credentials go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();

    let config = if app.command.requires_config() {
        let path = shellexpand::tilde(&app.config.to_string_lossy()).to_string();
        let config = load_config(&path)
            .with_context(|| format!("Failed to load configuration from '{}'", path))?;
        Some(config)
    } else {
        None
    };

    let default_level = config
        .as_ref()
        .map(|c| c.logging.level.as_str())
        .unwrap_or("warn");
    init_logging(app.verbose, app.debug, default_level)?;

    if let Some(config) = &config {
        tracing::debug!("Using provider at {}", config.api.get_base_url());
    }

    cli::execute(app, config).await
}

fn init_logging(verbose: bool, debug: bool, default_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new(default_level)
    };

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    Ok(())
}
