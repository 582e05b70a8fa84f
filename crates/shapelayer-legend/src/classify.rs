//! Styles and legend swatches per legend variant

use shapelayer_core::models::{ClassLegend, Color, LegendClassEntry, LegendDefinition};

use crate::filter::{Filter, FilterValue};
use crate::gradient::GradientScale;
use crate::style::{area, line, Rule, Style, Symbolizer};
use crate::swatch::{IconStyle, LegendSwatch};

/// Fill of the style used when no legend is bound (light brown).
pub const DEFAULT_FILL: Color = Color::rgb(0xff, 0xb9, 0x75);
/// Outline of the style used when no legend is bound.
pub const DEFAULT_LINE: Color = Color::rgb(0xdd, 0x00, 0x00);

/// Render style of a legend over `value_field`.
pub fn style_for(legend: &LegendDefinition, value_field: &str) -> Style {
    match legend {
        LegendDefinition::Gradient(gradient) => {
            GradientScale::from_legend(gradient).area_style(value_field)
        }
        LegendDefinition::Point(point) => GradientScale::from_legend(&point.gradient)
            .point_style(value_field, &IconStyle::for_point_legend(point)),
        LegendDefinition::Class(class) => class_style(class, value_field),
    }
}

/// Style for layers without a legend: one rule for every feature.
pub fn default_style() -> Style {
    Style::new(vec![Rule::new(None, vec![area(DEFAULT_FILL), line(DEFAULT_LINE, 1.0)])])
}

/// One area/line rule per entry in index order, plus an icon rule with the
/// same filter for entries that have an icon.
pub fn class_style(legend: &ClassLegend, value_field: &str) -> Style {
    let mut entries: Vec<&LegendClassEntry> = legend.classes.iter().collect();
    entries.sort_by_key(|e| e.index);

    let mut style = Style::default();
    for entry in entries {
        let filter = entry_filter(entry, value_field);
        style.push(Rule::new(filter.clone(), area_symbolizers(entry)));
        if entry.icon.is_some() {
            style.push(Rule::new(
                filter,
                vec![Symbolizer::Point { icon: IconStyle::for_class_entry(entry) }],
            ));
        }
    }
    style
}

/// Filter selecting the features an entry applies to, `None` for a
/// catch-all entry.
///
/// Whether bounds compare as numbers or as text is decided per entry by
/// `min_value`, or by `max_value` when there is no lower bound.
pub fn entry_filter(entry: &LegendClassEntry, field: &str) -> Option<Filter> {
    if entry.is_exact {
        let value = match entry.min_value.as_deref() {
            Some(v) => FilterValue::parse(v),
            None => {
                tracing::warn!(entry = entry.index, "Exact legend class without value matches empty values");
                FilterValue::Text(String::new())
            }
        };
        return Some(Filter::eq(field, value));
    }

    let numeric = entry
        .min_value
        .as_deref()
        .or(entry.max_value.as_deref())
        .map(|probe| FilterValue::parse(probe).is_number())
        .unwrap_or(false);
    let bound = |raw: &str| -> FilterValue {
        if !numeric {
            return FilterValue::Text(raw.to_string());
        }
        let value = FilterValue::parse(raw);
        if !value.is_number() {
            tracing::warn!(entry = entry.index, bound = raw, "Non-numeric bound in numeric legend class");
        }
        value
    };

    match (entry.min_value.as_deref(), entry.max_value.as_deref()) {
        (Some(min), Some(max)) => Some(Filter::range(field, bound(min), bound(max))),
        (Some(min), None) => Some(Filter::ge(field, bound(min))),
        (None, Some(max)) => Some(Filter::lt(field, bound(max))),
        (None, None) => None,
    }
}

fn area_symbolizers(entry: &LegendClassEntry) -> Vec<Symbolizer> {
    let mut symbolizers = Vec::new();
    if let Some(fill) = entry.color_inside.as_deref() {
        symbolizers.push(area(Color::parse_or_alarm(Some(fill))));
    }
    match entry.color.as_deref() {
        Some(border) => symbolizers.push(line(Color::parse_or_alarm(Some(border)), entry.size)),
        None if entry.color_inside.is_none() => {
            tracing::warn!(entry = entry.index, "Legend class has no colors, drawing alarm color");
            symbolizers.push(line(Color::ALARM, entry.size));
        }
        None => {}
    }
    symbolizers
}

/// Legend panel rows of a legend.
pub fn legend_swatches(legend: &LegendDefinition) -> Vec<LegendSwatch> {
    match legend {
        LegendDefinition::Gradient(gradient) => {
            GradientScale::from_legend(gradient).swatches(&IconStyle::default())
        }
        LegendDefinition::Point(point) => GradientScale::from_legend(&point.gradient)
            .swatches(&IconStyle::for_point_legend(point)),
        LegendDefinition::Class(class) => {
            let mut entries: Vec<&LegendClassEntry> = class.classes.iter().collect();
            entries.sort_by_key(|e| e.index);
            entries
                .into_iter()
                .map(|entry| {
                    let description = entry
                        .label
                        .clone()
                        .or_else(|| entry.min_value.clone())
                        .unwrap_or_default();
                    LegendSwatch::new(IconStyle::for_class_entry(entry), description)
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shapelayer_core::models::{Attributes, GradientLegend, PointLegend};

    fn attrs(value: serde_json::Value) -> Attributes {
        serde_json::from_value(json!({ "F": value })).unwrap()
    }

    fn class(entries: Vec<LegendClassEntry>) -> ClassLegend {
        entries.into_iter().fold(ClassLegend::new(1, "c", "F"), |l, e| l.with_class(e))
    }

    #[test]
    fn test_exact_numeric_entry_draws_red() {
        let legend = class(vec![LegendClassEntry::exact(1, "5").with_color("ff0000")]);
        let style = class_style(&legend, "F");
        assert_eq!(style.rules.len(), 1);
        assert_eq!(style.rules[0].filter.as_ref().unwrap().to_string(), "[F] = 5");

        assert_eq!(
            style.symbolizers_for(&attrs(json!(5))),
            vec![&Symbolizer::Line { color: Color::rgb(255, 0, 0), width: 1.0 }]
        );
        assert!(style.symbolizers_for(&attrs(json!(6))).is_empty());
    }

    #[test]
    fn test_exact_text_entry() {
        let filter = entry_filter(&LegendClassEntry::exact(1, "gemaal"), "F").unwrap();
        assert_eq!(filter.to_string(), "[F] = 'gemaal'");
        assert!(filter.matches(&attrs(json!("gemaal"))));
    }

    #[test]
    fn test_range_filters() {
        let both = entry_filter(&LegendClassEntry::range(1, Some("5"), Some("10")), "F").unwrap();
        assert_eq!(both.to_string(), "[F] >= 5 and [F] < 10");
        assert!(!both.matches(&attrs(json!(10))));

        let lower = entry_filter(&LegendClassEntry::range(1, Some("0"), None), "F").unwrap();
        assert_eq!(lower.to_string(), "[F] >= 0");
        assert!(!lower.matches(&attrs(json!(-1))));

        let upper = entry_filter(&LegendClassEntry::range(1, None, Some("3")), "F").unwrap();
        assert_eq!(upper.to_string(), "[F] < 3");

        assert!(entry_filter(&LegendClassEntry::range(1, None, None), "F").is_none());
    }

    #[test]
    fn test_text_range_compares_as_text() {
        let f = entry_filter(&LegendClassEntry::range(1, Some("a"), Some("m")), "F").unwrap();
        assert_eq!(f.to_string(), "[F] >= 'a' and [F] < 'm'");
        assert!(f.matches(&attrs(json!("kade"))));
        assert!(!f.matches(&attrs(json!("sluis"))));
    }

    #[test]
    fn test_fill_and_icon_rules() {
        let legend = class(vec![LegendClassEntry::range(1, Some("0"), Some("1"))
            .with_fill("00ff00")
            .with_color("000000")
            .with_size(2.0)
            .with_icon("pomp.png", Some("pomp_mask.png"))]);
        let style = class_style(&legend, "F");
        assert_eq!(style.rules.len(), 2);
        assert_eq!(
            style.rules[0].symbolizers,
            vec![
                Symbolizer::Polygon { fill: Color::rgb(0, 255, 0), opacity: 0.5 },
                Symbolizer::Line { color: Color::BLACK, width: 2.0 },
            ]
        );
        assert_eq!(style.rules[0].filter, style.rules[1].filter);
        match &style.rules[1].symbolizers[0] {
            Symbolizer::Point { icon } => {
                assert_eq!(icon.icon, "pomp.png");
                assert_eq!(icon.color, Color::rgb(0, 255, 0));
            }
            other => panic!("Expected point symbolizer, got {:?}", other),
        }
    }

    #[test]
    fn test_every_matching_entry_draws_in_index_order() {
        let legend = class(vec![
            LegendClassEntry::range(2, Some("0"), None).with_color("0000ff"),
            LegendClassEntry::range(1, None, None).with_color("ff0000"),
        ]);
        let style = class_style(&legend, "F");
        let drawn = style.symbolizers_for(&attrs(json!(4)));
        assert_eq!(
            drawn,
            vec![
                &Symbolizer::Line { color: Color::rgb(255, 0, 0), width: 1.0 },
                &Symbolizer::Line { color: Color::rgb(0, 0, 255), width: 1.0 },
            ]
        );
    }

    #[test]
    fn test_colorless_entry_draws_alarm() {
        let legend = class(vec![LegendClassEntry::exact(1, "x")]);
        let style = class_style(&legend, "F");
        assert_eq!(style.rules[0].symbolizers, vec![Symbolizer::Line { color: Color::ALARM, width: 1.0 }]);
    }

    #[test]
    fn test_default_style() {
        let style = default_style();
        assert_eq!(style.rules.len(), 1);
        assert!(style.rules[0].filter.is_none());
        assert_eq!(
            style.rules[0].symbolizers,
            vec![
                Symbolizer::Polygon { fill: Color::rgb(255, 185, 117), opacity: 0.5 },
                Symbolizer::Line { color: Color::rgb(221, 0, 0), width: 1.0 },
            ]
        );
    }

    #[test]
    fn test_class_swatches() {
        let legend = LegendDefinition::Class(class(vec![
            LegendClassEntry::exact(2, "5").with_fill("bogus"),
            LegendClassEntry::exact(1, "3").with_label("Drie").with_color("00ff00"),
            LegendClassEntry::range(3, None, None),
        ]));
        let swatches = legend_swatches(&legend);
        let descriptions: Vec<&str> = swatches.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Drie", "5", ""]);
        assert_eq!(swatches[0].icon_style.color, Color::rgb(0, 255, 0));
        assert_eq!(swatches[1].icon_style.color, Color::ALARM);
        assert_eq!(swatches[2].icon_style.color, Color::WHITE);
    }

    #[test]
    fn test_point_legend_style_uses_icon() {
        let point = PointLegend::new(GradientLegend::new(3, "Q", "Q").with_range(0.0, 1.0, 1))
            .with_icon("gemaal.png", None);
        let style = style_for(&LegendDefinition::Point(point), "Q");
        for rule in &style.rules {
            match &rule.symbolizers[0] {
                Symbolizer::Point { icon } => {
                    assert_eq!(icon.icon, "gemaal.png");
                    assert!(icon.mask.is_none());
                }
                other => panic!("Expected point symbolizer, got {:?}", other),
            }
        }
        let swatches = legend_swatches(&LegendDefinition::Point(
            PointLegend::new(GradientLegend::new(3, "Q", "Q").with_range(0.0, 1.0, 1)),
        ));
        assert_eq!(swatches.len(), 3);
        assert_eq!(swatches[0].icon_style.icon, "empty.png");
    }
}
