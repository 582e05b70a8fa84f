//! Linear color gradients over a numeric range
//!
//! `[min_value, max_value)` is split into `steps` equal buckets whose colors
//! run from `min_color` to `max_color`. Values below the range get the
//! too-low color, values at or above `max_value` the too-high color.

use shapelayer_core::models::{format_number, Color, GradientLegend};

use crate::filter::{Filter, FilterValue};
use crate::style::{area, line, Rule, Style, Symbolizer};
use crate::swatch::{IconStyle, LegendSwatch};

#[derive(Debug, Clone, PartialEq)]
pub struct GradientBucket {
    pub min: f64,
    pub max: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientScale {
    pub min_value: f64,
    pub max_value: f64,
    pub steps: u32,
    pub default_color: Color,
    pub min_color: Color,
    pub max_color: Color,
    pub too_low_color: Color,
    pub too_high_color: Color,
}

impl GradientScale {
    pub fn from_legend(legend: &GradientLegend) -> Self {
        let steps = if legend.steps == 0 {
            tracing::warn!(legend = legend.id, "Gradient legend has zero steps, using one");
            1
        } else {
            legend.steps
        };
        Self {
            min_value: legend.min_value,
            max_value: legend.max_value,
            steps,
            default_color: Color::parse_or_alarm(Some(&legend.default_color)),
            min_color: Color::parse_or_alarm(Some(&legend.min_color)),
            max_color: Color::parse_or_alarm(Some(&legend.max_color)),
            too_low_color: Color::parse_or_alarm(Some(&legend.too_low_color)),
            too_high_color: Color::parse_or_alarm(Some(&legend.too_high_color)),
        }
    }

    /// In-range buckets, lowest first. Empty when the range is empty.
    pub fn buckets(&self) -> Vec<GradientBucket> {
        if !(self.max_value > self.min_value) {
            return Vec::new();
        }
        let steps = self.steps.max(1);
        let width = (self.max_value - self.min_value) / f64::from(steps);
        (0..steps)
            .map(|i| {
                let t = if steps == 1 { 0.0 } else { f64::from(i) / f64::from(steps - 1) };
                let min = self.min_value + width * f64::from(i);
                let max = if i + 1 == steps {
                    self.max_value
                } else {
                    self.min_value + width * f64::from(i + 1)
                };
                GradientBucket { min, max, color: self.min_color.lerp(&self.max_color, t) }
            })
            .collect()
    }

    /// Color of a value; `None` (no value) gets the default color.
    pub fn color_for(&self, value: Option<f64>) -> Color {
        let value = match value {
            Some(v) if !v.is_nan() => v,
            _ => return self.default_color,
        };
        if value < self.min_value {
            return self.too_low_color;
        }
        if value >= self.max_value {
            return self.too_high_color;
        }
        self.buckets()
            .into_iter()
            .find(|b| b.min <= value && value < b.max)
            .map(|b| b.color)
            .unwrap_or(self.default_color)
    }

    /// Rules in draw order: too low, each bucket, too high, then the
    /// default color for features no rule selects.
    pub fn style<F>(&self, field: &str, symbolize: F) -> Style
    where
        F: Fn(Color) -> Vec<Symbolizer>,
    {
        let mut style = Style::default();
        style.push(Rule::new(
            Some(Filter::lt(field, FilterValue::Number(self.min_value))),
            symbolize(self.too_low_color),
        ));
        for bucket in self.buckets() {
            style.push(Rule::new(
                Some(Filter::range(
                    field,
                    FilterValue::Number(bucket.min),
                    FilterValue::Number(bucket.max),
                )),
                symbolize(bucket.color),
            ));
        }
        style.push(Rule::new(
            Some(Filter::ge(field, FilterValue::Number(self.max_value))),
            symbolize(self.too_high_color),
        ));
        style.push(Rule::otherwise(symbolize(self.default_color)));
        style
    }

    /// Area style: half-transparent fill with a matching outline.
    pub fn area_style(&self, field: &str) -> Style {
        self.style(field, |color| vec![area(color), line(color, 1.0)])
    }

    /// Point style: the given icon tinted per bucket.
    pub fn point_style(&self, field: &str, icon: &IconStyle) -> Style {
        self.style(field, |color| vec![Symbolizer::Point { icon: icon.clone().with_color(color) }])
    }

    /// Legend rows: too low, each bucket, too high.
    pub fn swatches(&self, icon: &IconStyle) -> Vec<LegendSwatch> {
        let mut swatches = Vec::new();
        swatches.push(LegendSwatch::new(
            icon.clone().with_color(self.too_low_color),
            format!("< {}", format_number(self.min_value)),
        ));
        for bucket in self.buckets() {
            swatches.push(LegendSwatch::new(
                icon.clone().with_color(bucket.color),
                format!("{} - {}", format_number(bucket.min), format_number(bucket.max)),
            ));
        }
        swatches.push(LegendSwatch::new(
            icon.clone().with_color(self.too_high_color),
            format!(">= {}", format_number(self.max_value)),
        ));
        swatches
    }
}
