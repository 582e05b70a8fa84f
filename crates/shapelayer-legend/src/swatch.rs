use serde::Serialize;
use shapelayer_core::models::legend::{default_icon, default_mask};
use shapelayer_core::models::{Color, LegendClassEntry, PointLegend};

/// Icon, mask and tint of a point symbol or legend swatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconStyle {
    pub icon: String,
    pub mask: Option<String>,
    pub color: Color,
}

impl Default for IconStyle {
    /// Blank white icon
    fn default() -> Self {
        Self { icon: default_icon(), mask: default_mask(), color: Color::WHITE }
    }
}

impl IconStyle {
    pub fn new(icon: impl Into<String>, mask: Option<String>, color: Color) -> Self {
        Self { icon: icon.into(), mask, color }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Stable reference handed to the symbol renderer, e.g.
    /// `icon=pump.png;mask=pump_mask.png;color=#ff0000`.
    pub fn symbol_key(&self) -> String {
        format!(
            "icon={};mask={};color={}",
            self.icon,
            self.mask.as_deref().unwrap_or(""),
            self.color.to_hex()
        )
    }

    /// Icon of a class entry: its own icon and mask over the blank
    /// defaults, tinted with the entry color.
    pub fn for_class_entry(entry: &LegendClassEntry) -> Self {
        let mut style = IconStyle::default();
        if entry.color_inside.is_some() || entry.color.is_some() {
            style.color = entry.legend_color();
        }
        if let Some(icon) = &entry.icon {
            style.icon = icon.clone();
        }
        if let Some(mask) = &entry.mask {
            style.mask = Some(mask.clone());
        }
        style
    }

    /// Icon of a point legend, tinted with its default color.
    pub fn for_point_legend(legend: &PointLegend) -> Self {
        IconStyle::new(
            legend.icon.clone(),
            legend.mask.clone(),
            Color::parse_or_alarm(Some(&legend.gradient.default_color)),
        )
    }
}

/// One row of the legend panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSwatch {
    pub icon_style: IconStyle,
    pub description: String,
}

impl LegendSwatch {
    pub fn new(icon_style: IconStyle, description: impl Into<String>) -> Self {
        Self { icon_style, description: description.into() }
    }
}
