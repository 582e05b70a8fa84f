use chrono::{DateTime, Utc};
use serde::Serialize;
use shapelayer_core::models::Identifier;
use shapelayer_core::Result;
use shapelayer_legend::IconStyle;

use crate::resolver::FeatureRecord;

/// Everything the popup template needs for a set of clicked features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    pub display_group: Vec<FeatureRecord>,
    pub add_snippet: bool,
    /// Point-legend symbol shown next to the records
    pub symbol: Option<IconStyle>,
    /// Time-series graph of the clicked features, when the dataset links one
    pub image_url: Option<String>,
    /// First timestamp of the linked time-series file
    pub timeseries_start: Option<DateTime<Utc>>,
}

/// Graph image URL: one percent-encoded `identifier=<json>` query parameter
/// per identifier.
pub fn image_url(base: &str, identifiers: &[Identifier]) -> Result<String> {
    let mut params = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        params.push(format!("identifier={}", urlencoding::encode(&serde_json::to_string(identifier)?)));
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", base, separator, params.join("&")))
}
