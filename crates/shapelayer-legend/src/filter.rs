//! Rule filters over a feature's attribute row
//!
//! A filter can be evaluated directly and rendered in the renderer's
//! expression syntax, e.g. `[VALUE] >= 5 and [VALUE] < 10`.

use serde::{Serialize, Serializer};
use shapelayer_core::models::{value_as_f64, value_key, Attributes};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ge,
    Lt,
}

impl Comparison {
    fn symbol(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
        }
    }

    fn holds<T: PartialOrd + ?Sized>(&self, left: &T, right: &T) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ge => left >= right,
            Comparison::Lt => left < right,
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    /// Number when the text parses as one, text otherwise.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => FilterValue::Number(n),
            _ => FilterValue::Text(raw.to_string()),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, FilterValue::Number(_))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Text(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare { field: String, op: Comparison, value: FilterValue },
    And(Vec<Filter>),
}

impl Filter {
    pub fn compare(field: &str, op: Comparison, value: FilterValue) -> Self {
        Filter::Compare { field: field.to_string(), op, value }
    }

    pub fn eq(field: &str, value: FilterValue) -> Self {
        Self::compare(field, Comparison::Eq, value)
    }

    pub fn ge(field: &str, value: FilterValue) -> Self {
        Self::compare(field, Comparison::Ge, value)
    }

    pub fn lt(field: &str, value: FilterValue) -> Self {
        Self::compare(field, Comparison::Lt, value)
    }

    /// Half-open range `min <= field < max`.
    pub fn range(field: &str, min: FilterValue, max: FilterValue) -> Self {
        Filter::And(vec![Self::ge(field, min), Self::lt(field, max)])
    }

    /// Evaluate against an attribute row. A missing or null attribute never
    /// matches; numeric comparisons need a numeric (or numeric text) value.
    pub fn matches(&self, attributes: &Attributes) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(attributes)),
            Filter::Compare { field, op, value } => {
                let attribute = match attributes.get(field) {
                    Some(serde_json::Value::Null) | None => return false,
                    Some(attribute) => attribute,
                };
                match value {
                    FilterValue::Number(n) => match value_as_f64(attribute) {
                        Some(v) => op.holds(&v, n),
                        None => false,
                    },
                    FilterValue::Text(s) => op.holds(value_key(attribute).as_str(), s.as_str()),
                }
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Compare { field, op, value } => {
                write!(f, "[{}] {} {}", field, op.symbol(), value)
            }
            Filter::And(filters) => {
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    write!(f, "{}", filter)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
