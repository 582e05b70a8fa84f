//! Configuration and catalog loading for CLI commands

use anyhow::{Context, Result};
use shapelayer_core::config::{parse_damping, CliConfigOverrides, LayeredConfig};
use shapelayer_core::memory::{FileTimeSeriesProvider, MemoryShapeCatalog};
use std::path::PathBuf;

use crate::cli::Cli;

/// Catalog file looked up in the data root when `--catalog` is absent
const DEFAULT_CATALOG: &str = "catalog.toml";

/// Layered configuration: defaults, config file, environment, CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }
    let mut config = config.load_from_env();
    config.update_from_cli(overrides(cli)?);
    Ok(config)
}

fn overrides(cli: &Cli) -> Result<CliConfigOverrides> {
    let radius_damping = cli
        .radius_damping
        .map(parse_damping)
        .transpose()
        .context("Invalid --radius-damping")?;
    if cli.max_search_results == Some(0) {
        anyhow::bail!("--max-search-results must be at least 1");
    }

    Ok(CliConfigOverrides {
        data_root: cli.data_root.clone(),
        trust_raw_paths: cli.trust_raw_paths.then_some(true),
        max_search_results: cli.max_search_results,
        radius_damping,
    })
}

/// The catalog named on the command line, or the one in the data root
pub fn catalog_path(cli: &Cli, config: &LayeredConfig) -> PathBuf {
    cli.catalog
        .clone()
        .unwrap_or_else(|| config.data_root.value.join(DEFAULT_CATALOG))
}

pub fn load_catalog(cli: &Cli, config: &LayeredConfig) -> Result<MemoryShapeCatalog> {
    let path = catalog_path(cli, config);
    MemoryShapeCatalog::load(&path)
        .with_context(|| format!("Failed to load shape catalog {}", path.display()))
}

/// Time-series files are resolved against the data root
pub fn timeseries_provider(config: &LayeredConfig) -> FileTimeSeriesProvider {
    FileTimeSeriesProvider::new(config.data_root.value.clone())
}
