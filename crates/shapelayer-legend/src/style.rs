use serde::Serialize;
use shapelayer_core::models::{Attributes, Color};

use crate::filter::Filter;
use crate::swatch::IconStyle;

/// Fill opacity of every area draw.
pub const AREA_OPACITY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Symbolizer {
    Polygon { fill: Color, opacity: f64 },
    Line { color: Color, width: f64 },
    Point { icon: IconStyle },
}

/// Symbolizers drawn for the features a filter selects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// `None` selects every feature
    pub filter: Option<Filter>,
    /// Drawn only for features no other rule selects
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub else_rule: bool,
    pub symbolizers: Vec<Symbolizer>,
}

impl Rule {
    pub fn new(filter: Option<Filter>, symbolizers: Vec<Symbolizer>) -> Self {
        Self { filter, else_rule: false, symbolizers }
    }

    pub fn otherwise(symbolizers: Vec<Symbolizer>) -> Self {
        Self { filter: None, else_rule: true, symbolizers }
    }

    fn selects(&self, attributes: &Attributes) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(attributes))
    }
}

/// Ordered rules; every matching rule draws, in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Style {
    pub rules: Vec<Rule>,
}

impl Style {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Rules that draw a feature with these attributes, in draw order.
    pub fn matching_rules<'a>(&'a self, attributes: &Attributes) -> Vec<&'a Rule> {
        let matched: Vec<&Rule> =
            self.rules.iter().filter(|r| !r.else_rule && r.selects(attributes)).collect();
        if matched.is_empty() {
            self.rules.iter().filter(|r| r.else_rule).collect()
        } else {
            matched
        }
    }

    /// Symbolizers drawn for a feature, in draw order.
    pub fn symbolizers_for(&self, attributes: &Attributes) -> Vec<&Symbolizer> {
        self.matching_rules(attributes).into_iter().flat_map(|r| r.symbolizers.iter()).collect()
    }
}

pub(crate) fn area(fill: Color) -> Symbolizer {
    Symbolizer::Polygon { fill, opacity: AREA_OPACITY }
}

pub(crate) fn line(color: Color, width: f64) -> Symbolizer {
    Symbolizer::Line { color, width }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use serde_json::json;

    fn attrs(v: i64) -> Attributes {
        serde_json::from_value(json!({ "F": v })).unwrap()
    }

    #[test]
    fn test_every_matching_rule_draws() {
        let style = Style::new(vec![
            Rule::new(None, vec![line(Color::BLACK, 1.0)]),
            Rule::new(Some(Filter::ge("F", FilterValue::Number(5.0))), vec![area(Color::WHITE)]),
        ]);
        assert_eq!(style.symbolizers_for(&attrs(7)).len(), 2);
        assert_eq!(style.symbolizers_for(&attrs(1)).len(), 1);
    }

    #[test]
    fn test_else_rule_only_when_nothing_matched() {
        let style = Style::new(vec![
            Rule::new(Some(Filter::ge("F", FilterValue::Number(5.0))), vec![area(Color::WHITE)]),
            Rule::otherwise(vec![area(Color::BLACK)]),
        ]);
        assert_eq!(style.symbolizers_for(&attrs(6)), vec![&area(Color::WHITE)]);
        assert_eq!(style.symbolizers_for(&attrs(1)), vec![&area(Color::BLACK)]);
    }

    #[test]
    fn test_serialize_rule() {
        let rule = Rule::new(
            Some(Filter::lt("F", FilterValue::Number(2.0))),
            vec![line(Color::rgb(221, 0, 0), 1.0)],
        );
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["filter"], "[F] < 2");
        assert_eq!(value["symbolizers"][0]["type"], "line");
        assert_eq!(value["symbolizers"][0]["color"], "#dd0000");
        assert!(value.get("else_rule").is_none());
    }
}
