//! CLI Adapter
//!
//! Command-line interface for the stock heatmap.
//! Uses clap derive macros for argument parsing.

mod commands;
pub mod render;

pub use commands::{CliApp, Command, PricesCmd, HeatmapCmd, OutputFormat, resolve_window};

use anyhow::Result;

use crate::config::Config;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp, config: Option<Config>) -> Result<()> {
    commands::execute(app, config).await
}
