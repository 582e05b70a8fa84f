//! Command implementations

mod check;
mod config;
mod extent;
mod graph;
mod layers;
mod legend;
mod popup;
mod search;
mod style;

use crate::cli::{Cli, Commands};
use crate::config_loader::{load_catalog, load_config, timeseries_provider};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use shapelayer_adapter::ShapeLayerAdapter;
use shapelayer_core::config::{AdapterConfig, LayeredConfig};
use shapelayer_core::memory::{FileTimeSeriesProvider, MemoryShapeCatalog};
use shapelayer_core::models::{Identifier, LayerArguments};
use std::io::Read;
use std::path::Path;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let layered = load_config(&cli)?;

    match &cli.command {
        Commands::Config => config::execute(&layered, &output),
        Commands::Layers => layers::execute(&Session::open(&cli, layered)?, &output),
        Commands::Check(args) => check::execute(args, &Session::open(&cli, layered)?, &output),
        Commands::Style(args) => style::execute(args, &Session::open(&cli, layered)?, &output),
        Commands::Legend(args) => legend::execute(args, &Session::open(&cli, layered)?, &output),
        Commands::Extent(args) => extent::execute(args, &Session::open(&cli, layered)?, &output),
        Commands::Search(args) => search::execute(args, &Session::open(&cli, layered)?, &output),
        Commands::Popup(args) => popup::execute(args, &Session::open(&cli, layered)?, &output),
        Commands::Graph(args) => graph::execute(args, &Session::open(&cli, layered)?, &output),
    }
}

/// Catalog, time-series files and configuration shared by the commands
pub struct Session {
    pub catalog: MemoryShapeCatalog,
    pub provider: FileTimeSeriesProvider,
    pub config: AdapterConfig,
}

impl Session {
    fn open(cli: &Cli, config: LayeredConfig) -> Result<Self> {
        let catalog = load_catalog(cli, &config)?;
        Ok(Self {
            catalog,
            provider: timeseries_provider(&config),
            config: config.resolve(),
        })
    }

    /// Adapter for the layer arguments stored in `path`
    pub fn adapter(&self, path: &Path) -> Result<ShapeLayerAdapter<'_>> {
        let args = read_layer_arguments(path)?;
        ShapeLayerAdapter::new(args, &self.catalog, &self.provider, self.config.clone())
            .context("Failed to set up layer")
    }
}

fn read_layer_arguments(path: &Path) -> Result<LayerArguments> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read layer arguments from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layer arguments {}", path.display()))?
    };
    LayerArguments::from_json(&content).context("Invalid layer arguments")
}

/// Identifiers from the command line: JSON values when they parse, else
/// plain strings.
pub fn parse_identifiers(ids: &[String]) -> Vec<Identifier> {
    ids.iter()
        .map(|id| match serde_json::from_str::<serde_json::Value>(id) {
            Ok(value) if !value.is_object() && !value.is_array() => Identifier::new(value),
            _ => Identifier::new(id.as_str()),
        })
        .collect()
}
