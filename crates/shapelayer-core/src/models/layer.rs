//! Layer arguments: the flat configuration payload an adapter is built from.

use serde::{Deserialize, Serialize};

use super::legend::{LegendDefinition, LegendKind};
use super::shape::{Shape, ShapeId};
use super::template::FieldType;
use crate::error::{Result, ShapeLayerError};

/// A popup column: display name, source field and how to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayField {
    pub name: String,
    pub field: String,
    #[serde(default)]
    pub field_type: FieldType,
}

/// Configuration of one map layer.
///
/// Exactly one shape reference is used, in the priority order
/// `shape_slug`, `shape_id`, `resource_module` + `resource_name`,
/// `layer_filename`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerArguments {
    pub layer_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_id: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_property_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_type: Option<LegendKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub display_fields: Vec<DisplayField>,
}

impl LayerArguments {
    /// Parse the JSON payload. Unknown legend types are rejected here.
    pub fn from_json(json: &str) -> Result<Self> {
        let args: LayerArguments = serde_json::from_str(json).map_err(|e| {
            ShapeLayerError::ConfigInvalid { key: "layer arguments".to_string(), reason: e.to_string() }
        })?;
        if args.layer_name.trim().is_empty() {
            return Err(ShapeLayerError::ConfigMissing { key: "layer_name".to_string() });
        }
        Ok(args)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Display fields, falling back to the single value field.
    pub fn effective_display_fields(&self) -> Vec<DisplayField> {
        if !self.display_fields.is_empty() {
            return self.display_fields.clone();
        }
        match &self.value_field {
            Some(field) => vec![DisplayField {
                name: self.value_name.clone().unwrap_or_else(|| field.clone()),
                field: field.clone(),
                field_type: FieldType::Normal,
            }],
            None => Vec::new(),
        }
    }

    /// Arguments for showing `shape` styled by one of its template legends.
    pub fn for_legend(shape: &Shape, legend: &LegendDefinition) -> Self {
        let display_fields = shape
            .template
            .ordered_fields()
            .into_iter()
            .map(|f| DisplayField {
                name: f.name.clone(),
                field: f.field.clone(),
                field_type: f.field_type,
            })
            .collect();

        Self {
            layer_name: shape.name.clone(),
            shape_slug: Some(shape.slug.clone()),
            search_property_name: shape.template.name_field.clone(),
            search_property_id: shape.template.id_field.clone(),
            legend_id: Some(legend.id()),
            legend_type: Some(legend.kind()),
            value_field: Some(legend.value_field().to_string()),
            value_name: Some(legend.descriptor().to_string()),
            display_fields,
            ..Default::default()
        }
    }
}

/// Selectable map layer entry: one per (shape, legend) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeItem {
    pub name: String,
    pub description: Option<String>,
    pub adapter_layer_json: String,
}

impl TreeItem {
    /// Items for every legend of the shape's template, gradient legends
    /// first, then point and class legends.
    pub fn for_shape(shape: &Shape) -> Result<Vec<TreeItem>> {
        let mut items = Vec::with_capacity(shape.template.legends.len());
        for kind in [LegendKind::Gradient, LegendKind::Point, LegendKind::Class] {
            for legend in shape.template.legends.iter().filter(|l| l.kind() == kind) {
                let args = LayerArguments::for_legend(shape, legend);
                items.push(TreeItem {
                    name: format!("{} - {}", shape.name, legend),
                    description: shape.description.clone(),
                    adapter_layer_json: args.to_json()?,
                });
            }
        }
        Ok(items)
    }
}
