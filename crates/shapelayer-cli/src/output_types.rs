//! Structured output types for JSON mode

use serde::Serialize;
use shapelayer_adapter::RenderLayer;
use shapelayer_legend::Style;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::Tabled;

/// One selectable layer
#[derive(Debug, Serialize, Tabled)]
pub struct LayerRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Layer arguments")]
    pub adapter_layer_json: String,
}

/// Output for check command
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub slug: String,
    pub shp: PathBuf,
    pub prj_file: PathBuf,
    pub prj: String,
    pub changed: bool,
}

/// Output for style command
#[derive(Debug, Serialize)]
pub struct StyleOutput {
    pub layers: Vec<RenderLayer>,
    pub styles: BTreeMap<String, Style>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct LegendRow {
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Icon")]
    pub icon: String,
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct SearchRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Identifier")]
    pub identifier: String,
    #[tabled(rename = "Distance")]
    pub distance: String,
    #[tabled(rename = "Coordinates")]
    pub coordinates: String,
}

/// Output for graph command
#[derive(Debug, Serialize)]
pub struct GraphOutput {
    pub path: PathBuf,
    pub title: Option<String>,
    pub series: usize,
    pub bytes: usize,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
