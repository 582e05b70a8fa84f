//! Shapelayer CLI - Command-line interface
//!
//! Inspects a shape catalog and runs the layer adapter operations against
//! layer argument files.

mod cli;
mod commands;
mod config_loader;
mod output;
mod output_types;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    commands::execute(cli)
}
