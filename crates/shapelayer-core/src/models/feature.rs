use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute table row of one feature, keyed by (whitespace-stripped) column name.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Placeholder shown for a mapped display field the feature does not carry.
pub const NOT_PRESENT: &str = "Not present in data";

/// Reference to a feature by the value of its template id field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: serde_json::Value,
}

impl Identifier {
    pub fn new(id: impl Into<serde_json::Value>) -> Self {
        Self { id: id.into() }
    }

    /// Canonical text form used for comparisons.
    ///
    /// Identifiers come back from the browser as JSON, so `12`, `12.0` and
    /// `"12"` all refer to the same feature.
    pub fn key(&self) -> String {
        value_key(&self.id)
    }
}

/// Canonical text form of an attribute value.
pub fn value_key(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Human-readable rendering of an attribute value for names and popups.
///
/// Whole numbers print without decimals, other floats with two.
pub fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) => format_number(f),
            None => n.to_string(),
        },
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whole numbers without decimals, anything else with two.
pub fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{:.2}", f)
    }
}

/// Numeric view of an attribute value; numeric strings count.
pub fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
