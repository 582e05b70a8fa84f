use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shapelayer")]
#[command(about = "Legend styling, search and popups for uploaded shapefiles", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Shape catalog (TOML); defaults to catalog.toml in the data root
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Directory raw layer filenames are resolved against
    #[arg(long, global = true, value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    /// Accept raw layer filenames outside the data root
    #[arg(long, global = true)]
    pub trust_raw_paths: bool,

    /// Maximum number of search results
    #[arg(long, global = true, value_name = "N")]
    pub max_search_results: Option<usize>,

    /// Radius damping applied to search radii, in (0, 1]
    #[arg(long, global = true, value_name = "D")]
    pub radius_damping: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List selectable layers for every shape and legend
    Layers,

    /// Re-detect the projection of a registered shape
    Check(CheckArgs),

    /// Show the render layers and styles of a layer
    Style(LayerFileArgs),

    /// Show the legend of a layer
    Legend(LayerFileArgs),

    /// Show the extent of a layer in display coordinates
    Extent(LayerFileArgs),

    /// Find features near a display-CRS point
    Search(SearchArgs),

    /// Show popup content for features
    Popup(PopupArgs),

    /// Render the time-series graph of features to a PNG file
    Graph(GraphArgs),

    /// Show resolved configuration values and their sources
    Config,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Slug of the registered shape
    pub slug: String,
}

#[derive(Args)]
pub struct LayerFileArgs {
    /// File with layer arguments as JSON ("-" reads stdin)
    pub layer: PathBuf,
}

#[derive(Args)]
pub struct SearchArgs {
    /// File with layer arguments as JSON ("-" reads stdin)
    pub layer: PathBuf,

    /// X coordinate in the display CRS
    #[arg(allow_negative_numbers = true)]
    pub x: f64,

    /// Y coordinate in the display CRS
    #[arg(allow_negative_numbers = true)]
    pub y: f64,

    /// Search radius in display units
    #[arg(long)]
    pub radius: Option<f64>,
}

#[derive(Args)]
pub struct PopupArgs {
    /// File with layer arguments as JSON ("-" reads stdin)
    pub layer: PathBuf,

    /// Feature identifiers; JSON values are accepted
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Render the popup as a snippet
    #[arg(long)]
    pub add_snippet: bool,
}

#[derive(Args)]
pub struct GraphArgs {
    /// File with layer arguments as JSON ("-" reads stdin)
    pub layer: PathBuf,

    /// Feature identifiers; JSON values are accepted
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Start of the period (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// End of the period (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// Image width in pixels
    #[arg(long, default_value = "380")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "250")]
    pub height: u32,

    /// Output PNG file
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}
