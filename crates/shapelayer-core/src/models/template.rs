use serde::{Deserialize, Serialize};
use std::fmt;

use super::legend::LegendDefinition;
use crate::error::ShapeLayerError;

/// How a display field value is presented in a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum FieldType {
    /// Plain text
    #[default]
    Normal,
    /// Web link
    Url,
    /// Image link
    Image,
}

impl TryFrom<u8> for FieldType {
    type Error = ShapeLayerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FieldType::Normal),
            2 => Ok(FieldType::Url),
            3 => Ok(FieldType::Image),
            other => Err(ShapeLayerError::ConfigInvalid {
                key: "field_type".to_string(),
                reason: format!("Unknown field type {}. Use 1 (text), 2 (url) or 3 (image)", other),
            }),
        }
    }
}

impl From<FieldType> for u8 {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Normal => 1,
            FieldType::Url => 2,
            FieldType::Image => 3,
        }
    }
}

/// A template column shown in popups, ordered by `index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeField {
    pub name: String,
    pub field: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default = "default_field_index")]
    pub index: i32,
}

fn default_field_index() -> i32 {
    1000
}

/// Field layout shared by every shapefile uploaded with the same columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeTemplate {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub id_field: Option<String>,
    #[serde(default)]
    pub name_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<ShapeField>,
    #[serde(default)]
    pub legends: Vec<LegendDefinition>,
}

impl ShapeTemplate {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            id_field: None,
            name_field: None,
            fields: Vec::new(),
            legends: Vec::new(),
        }
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    pub fn with_name_field(mut self, field: impl Into<String>) -> Self {
        self.name_field = Some(field.into());
        self
    }

    pub fn with_field(mut self, field: ShapeField) -> Self {
        self.fields.push(field);
        self.fields.sort_by_key(|f| f.index);
        self
    }

    pub fn with_legend(mut self, legend: LegendDefinition) -> Self {
        self.legends.push(legend);
        self
    }

    /// Display fields in index order.
    pub fn ordered_fields(&self) -> Vec<&ShapeField> {
        let mut fields: Vec<&ShapeField> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.index);
        fields
    }
}

impl fmt::Display for ShapeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_int() {
        assert_eq!(FieldType::try_from(1).unwrap(), FieldType::Normal);
        assert_eq!(FieldType::try_from(3).unwrap(), FieldType::Image);
        assert!(FieldType::try_from(9).is_err());
    }

    #[test]
    fn test_fields_sorted_by_index() {
        let template = ShapeTemplate::new(1, "kunstwerken")
            .with_field(ShapeField {
                name: "Type".into(),
                field: "TYPE".into(),
                field_type: FieldType::Normal,
                index: 20,
            })
            .with_field(ShapeField {
                name: "Naam".into(),
                field: "NAAM".into(),
                field_type: FieldType::Normal,
                index: 10,
            });

        let names: Vec<&str> = template.ordered_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Naam", "Type"]);
    }
}
