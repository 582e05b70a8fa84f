use super::Session;
use crate::output::OutputWriter;
use crate::output_types::LayerRow;
use anyhow::{Context, Result};
use shapelayer_core::models::TreeItem;
use shapelayer_core::ports::ShapeCatalog;

/// Selectable layers of every catalog shape, ordered by shape name
pub fn execute(session: &Session, output: &OutputWriter) -> Result<()> {
    let mut shapes = session.catalog.shapes()?;
    shapes.sort_by(|a, b| a.name.cmp(&b.name));

    let mut rows = Vec::new();
    for shape in &shapes {
        let items = TreeItem::for_shape(shape)
            .with_context(|| format!("Failed to list layers of {}", shape.slug))?;
        rows.extend(items.into_iter().map(|item| LayerRow {
            name: item.name,
            description: item.description.unwrap_or_default(),
            adapter_layer_json: item.adapter_layer_json,
        }));
    }

    tracing::debug!(shapes = shapes.len(), layers = rows.len(), "Listed layers");
    output.table(rows)
}
