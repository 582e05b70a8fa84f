//! Legend definitions: gradient, point-icon and discrete-class legends.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::color::Color;
use crate::error::ShapeLayerError;

/// Legend variant tag as it appears in layer arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegendKind {
    #[serde(rename = "ShapeLegend")]
    Gradient,
    #[serde(rename = "ShapeLegendPoint")]
    Point,
    #[serde(rename = "ShapeLegendClass")]
    Class,
}

impl LegendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegendKind::Gradient => "ShapeLegend",
            LegendKind::Point => "ShapeLegendPoint",
            LegendKind::Class => "ShapeLegendClass",
        }
    }
}

impl FromStr for LegendKind {
    type Err = ShapeLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ShapeLegend" => Ok(LegendKind::Gradient),
            "ShapeLegendPoint" => Ok(LegendKind::Point),
            "ShapeLegendClass" => Ok(LegendKind::Class),
            other => Err(ShapeLayerError::ConfigInvalid {
                key: "legend_type".to_string(),
                reason: format!(
                    "Unknown legend type {:?}. Use ShapeLegend, ShapeLegendPoint or ShapeLegendClass",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for LegendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Continuous color gradient over a numeric value field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientLegend {
    pub id: u64,
    pub descriptor: String,
    pub value_field: String,
    #[serde(default)]
    pub min_value: f64,
    #[serde(default = "default_max_value")]
    pub max_value: f64,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_color")]
    pub default_color: String,
    #[serde(default = "default_min_color")]
    pub min_color: String,
    #[serde(default = "default_max_color")]
    pub max_color: String,
    #[serde(default = "default_too_low_color")]
    pub too_low_color: String,
    #[serde(default = "default_too_high_color")]
    pub too_high_color: String,
}

fn default_max_value() -> f64 {
    100.0
}

fn default_steps() -> u32 {
    10
}

fn default_color() -> String {
    "888888".to_string()
}

fn default_min_color() -> String {
    "00ff00".to_string()
}

fn default_max_color() -> String {
    "ff0000".to_string()
}

fn default_too_low_color() -> String {
    "0000ff".to_string()
}

fn default_too_high_color() -> String {
    "000000".to_string()
}

impl GradientLegend {
    pub fn new(id: u64, descriptor: impl Into<String>, value_field: impl Into<String>) -> Self {
        Self {
            id,
            descriptor: descriptor.into(),
            value_field: value_field.into(),
            min_value: 0.0,
            max_value: default_max_value(),
            steps: default_steps(),
            default_color: default_color(),
            min_color: default_min_color(),
            max_color: default_max_color(),
            too_low_color: default_too_low_color(),
            too_high_color: default_too_high_color(),
        }
    }

    pub fn with_range(mut self, min_value: f64, max_value: f64, steps: u32) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self.steps = steps;
        self
    }

    pub fn with_colors(
        mut self,
        min_color: impl Into<String>,
        max_color: impl Into<String>,
        too_low_color: impl Into<String>,
        too_high_color: impl Into<String>,
    ) -> Self {
        self.min_color = min_color.into();
        self.max_color = max_color.into();
        self.too_low_color = too_low_color.into();
        self.too_high_color = too_high_color.into();
        self
    }
}

/// Gradient legend drawn as icons on point features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLegend {
    #[serde(flatten)]
    pub gradient: GradientLegend,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_mask")]
    pub mask: Option<String>,
}

pub fn default_icon() -> String {
    "empty.png".to_string()
}

pub fn default_mask() -> Option<String> {
    Some("empty_mask.png".to_string())
}

impl PointLegend {
    pub fn new(gradient: GradientLegend) -> Self {
        Self { gradient, icon: default_icon(), mask: default_mask() }
    }

    pub fn with_icon(mut self, icon: impl Into<String>, mask: Option<String>) -> Self {
        self.icon = icon.into();
        self.mask = mask;
        self
    }
}

/// One discrete classification rule of a [`ClassLegend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendClassEntry {
    #[serde(default)]
    pub index: i32,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_value: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_value: Option<String>,
    #[serde(default)]
    pub is_exact: bool,
    /// Border / line color
    #[serde(default, deserialize_with = "blank_as_none")]
    pub color: Option<String>,
    /// Fill color
    #[serde(default, deserialize_with = "blank_as_none")]
    pub color_inside: Option<String>,
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub mask: Option<String>,
}

fn default_size() -> f64 {
    1.0
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(non_blank(value))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl LegendClassEntry {
    pub fn new(index: i32) -> Self {
        Self {
            index,
            label: None,
            min_value: None,
            max_value: None,
            is_exact: false,
            color: None,
            color_inside: None,
            size: default_size(),
            icon: None,
            mask: None,
        }
    }

    pub fn exact(index: i32, value: impl Into<String>) -> Self {
        let mut entry = Self::new(index);
        entry.is_exact = true;
        entry.min_value = non_blank(Some(value.into()));
        entry
    }

    pub fn range(index: i32, min_value: Option<&str>, max_value: Option<&str>) -> Self {
        let mut entry = Self::new(index);
        entry.min_value = non_blank(min_value.map(str::to_string));
        entry.max_value = non_blank(max_value.map(str::to_string));
        entry
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = non_blank(Some(label.into()));
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = non_blank(Some(color.into()));
        self
    }

    pub fn with_fill(mut self, color_inside: impl Into<String>) -> Self {
        self.color_inside = non_blank(Some(color_inside.into()));
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>, mask: Option<&str>) -> Self {
        self.icon = non_blank(Some(icon.into()));
        self.mask = non_blank(mask.map(str::to_string));
        self
    }

    /// Swatch / icon color: fill, else border, else [`Color::ALARM`].
    ///
    /// A color that is set but unparseable is skipped with a warning.
    pub fn legend_color(&self) -> Color {
        for (kind, value) in [("fill", &self.color_inside), ("border", &self.color)] {
            if let Some(raw) = value {
                match raw.parse::<Color>() {
                    Ok(color) => return color,
                    Err(e) => tracing::warn!(
                        entry = self.index,
                        kind,
                        error = %e,
                        "Ignoring malformed legend class color"
                    ),
                }
            }
        }
        Color::ALARM
    }

    /// Entry with neither bound: applies to every feature.
    pub fn is_catch_all(&self) -> bool {
        !self.is_exact && self.min_value.is_none() && self.max_value.is_none()
    }
}

/// Ordered list of discrete classification rules over one value field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLegend {
    pub id: u64,
    pub descriptor: String,
    pub value_field: String,
    #[serde(default)]
    pub classes: Vec<LegendClassEntry>,
}

impl ClassLegend {
    pub fn new(id: u64, descriptor: impl Into<String>, value_field: impl Into<String>) -> Self {
        Self { id, descriptor: descriptor.into(), value_field: value_field.into(), classes: Vec::new() }
    }

    pub fn with_class(mut self, entry: LegendClassEntry) -> Self {
        self.classes.push(entry);
        self.sort_classes();
        self
    }

    /// Keep entries in render (index) order. The sort is stable so equal
    /// indices keep their insertion order.
    pub fn sort_classes(&mut self) {
        self.classes.sort_by_key(|c| c.index);
    }
}

/// A legend bound to a template, one of the three supported variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LegendDefinition {
    #[serde(rename = "ShapeLegend")]
    Gradient(GradientLegend),
    #[serde(rename = "ShapeLegendPoint")]
    Point(PointLegend),
    #[serde(rename = "ShapeLegendClass")]
    Class(ClassLegend),
}

impl LegendDefinition {
    pub fn kind(&self) -> LegendKind {
        match self {
            LegendDefinition::Gradient(_) => LegendKind::Gradient,
            LegendDefinition::Point(_) => LegendKind::Point,
            LegendDefinition::Class(_) => LegendKind::Class,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            LegendDefinition::Gradient(l) => l.id,
            LegendDefinition::Point(l) => l.gradient.id,
            LegendDefinition::Class(l) => l.id,
        }
    }

    pub fn descriptor(&self) -> &str {
        match self {
            LegendDefinition::Gradient(l) => &l.descriptor,
            LegendDefinition::Point(l) => &l.gradient.descriptor,
            LegendDefinition::Class(l) => &l.descriptor,
        }
    }

    pub fn value_field(&self) -> &str {
        match self {
            LegendDefinition::Gradient(l) => &l.value_field,
            LegendDefinition::Point(l) => &l.gradient.value_field,
            LegendDefinition::Class(l) => &l.value_field,
        }
    }
}

impl fmt::Display for LegendDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}
