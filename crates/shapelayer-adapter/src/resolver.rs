//! Feature lookup by identifier for popups and detail views

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shapelayer_core::models::{
    value_key, Attributes, DisplayField, FieldType, Identifier, TimeSeriesLink, NOT_PRESENT,
};
use shapelayer_core::ports::{TimeSeriesPoint, TimeSeriesProvider};
use shapelayer_core::Result;
use shapelayer_geo::FeatureStore;

/// One popup column of a resolved feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub name: String,
    pub value: serde_json::Value,
    pub value_type: FieldType,
}

/// A feature resolved by identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub name: serde_json::Value,
    pub shortname: serde_json::Value,
    pub value_name: Option<String>,
    pub value: serde_json::Value,
    pub values: Vec<FieldValue>,
    /// Complete attribute row
    pub object: Attributes,
    pub identifier: Identifier,
}

/// A single record when exactly one was asked for, a list otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    One(FeatureRecord),
    Many(Vec<FeatureRecord>),
}

impl Resolved {
    pub fn into_vec(self) -> Vec<FeatureRecord> {
        match self {
            Resolved::One(record) => vec![record],
            Resolved::Many(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Resolved::One(_) => 1,
            Resolved::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct FeatureResolver {
    pub store: FeatureStore,
    pub id_field: Option<String>,
    pub name_field: Option<String>,
    pub value_field: Option<String>,
    pub value_name: Option<String>,
    pub display_fields: Vec<DisplayField>,
    pub timeseries: Option<TimeSeriesLink>,
}

impl FeatureResolver {
    /// Scan the whole dataset for features with geometry whose id field
    /// value is one of `ids`. A feature that cannot be read ends the scan;
    /// records matched before it are kept.
    pub fn resolve(&self, ids: &[Identifier], force_list: bool) -> Result<Resolved> {
        if ids.is_empty() {
            tracing::warn!("No id given to resolve");
            return Ok(Resolved::Many(Vec::new()));
        }
        let wanted: BTreeSet<String> = ids.iter().map(Identifier::key).collect();
        tracing::debug!(ids = ?wanted, fields = ?self.display_fields, "Resolving locations");

        let id_field = self.id_field.as_deref().unwrap_or_default();
        let mut records = Vec::new();
        let mut reported_missing_id = false;

        let mut open = self.store.open()?;
        for feature in open.features() {
            let feature = match feature {
                Ok(feature) => feature,
                Err(e) => {
                    tracing::error!(error = %e, found = records.len(), "Resolve: stopped reading dataset");
                    break;
                }
            };
            let id = match feature.require(id_field) {
                Ok(id) => id,
                Err(e) => {
                    if !reported_missing_id {
                        tracing::error!(error = %e, "Search property id not available");
                        reported_missing_id = true;
                    }
                    continue;
                }
            };
            if feature.geometry.is_none() || !wanted.contains(&value_key(id)) {
                continue;
            }
            records.push(self.record(&feature.attributes, Identifier::new(id.clone())));
        }

        tracing::debug!(found = records.len(), "Resolved locations");
        if records.len() == 1 && !force_list {
            Ok(Resolved::One(records.remove(0)))
        } else {
            Ok(Resolved::Many(records))
        }
    }

    fn record(&self, attributes: &Attributes, identifier: Identifier) -> FeatureRecord {
        let values = self
            .display_fields
            .iter()
            .map(|field| FieldValue {
                name: field.name.clone(),
                value: lookup(attributes, &field.field),
                value_type: field.field_type,
            })
            .collect();
        let name = match self.name_field.as_deref() {
            Some(field) => lookup(attributes, field),
            None => serde_json::Value::Null,
        };
        let value = match self.value_field.as_deref() {
            Some(field) => lookup(attributes, field),
            None => serde_json::Value::Null,
        };

        FeatureRecord {
            shortname: name.clone(),
            name,
            value_name: self.value_name.clone(),
            value,
            values,
            object: attributes.clone(),
            identifier,
        }
    }

    /// Series of the linked parameter at `location`; empty without a link
    /// or parameter.
    pub fn timeseries(
        &self,
        provider: &dyn TimeSeriesProvider,
        location: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let Some(link) = &self.timeseries else {
            return Ok(Vec::new());
        };
        let Some(parameter) = link.parameter.as_deref() else {
            return Ok(Vec::new());
        };
        provider.open(link)?.get_timeseries(location, parameter, start, end)
    }
}

fn lookup(attributes: &Attributes, field: &str) -> serde_json::Value {
    attributes
        .get(field)
        .cloned()
        .unwrap_or_else(|| serde_json::Value::String(NOT_PRESENT.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use shapelayer_core::memory::MemoryTimeSeriesFile;
    use shapelayer_core::ports::TimeSeriesFile;

    fn resolver() -> FeatureResolver {
        FeatureResolver {
            store: FeatureStore::new("/nonexistent/kw.shp"),
            id_field: Some("KWKIDENT".to_string()),
            name_field: Some("KWKNAAM".to_string()),
            value_field: Some("PEIL".to_string()),
            value_name: Some("Peil".to_string()),
            display_fields: vec![
                DisplayField {
                    name: "Peil".to_string(),
                    field: "PEIL".to_string(),
                    field_type: FieldType::Normal,
                },
                DisplayField {
                    name: "Foto".to_string(),
                    field: "FOTO".to_string(),
                    field_type: FieldType::Image,
                },
            ],
            timeseries: None,
        }
    }

    #[test]
    fn test_record_marks_missing_fields() {
        let attributes: Attributes =
            serde_json::from_value(json!({ "KWKIDENT": "KW1", "KWKNAAM": "Gemaal", "PEIL": 1.5 }))
                .unwrap();
        let record = resolver().record(&attributes, Identifier::new("KW1"));
        assert_eq!(record.name, json!("Gemaal"));
        assert_eq!(record.shortname, record.name);
        assert_eq!(record.value, json!(1.5));
        assert_eq!(record.values[0].value, json!(1.5));
        assert_eq!(record.values[1].value, json!(NOT_PRESENT));
        assert_eq!(record.values[1].value_type, FieldType::Image);
    }

    #[test]
    fn test_empty_ids_resolve_to_empty_list() {
        let resolved = resolver().resolve(&[], false).unwrap();
        assert_eq!(resolved, Resolved::Many(Vec::new()));
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        assert!(resolver().resolve(&[Identifier::new("KW1")], false).is_err());
    }

    struct OneFile;

    impl TimeSeriesProvider for OneFile {
        fn open(&self, _link: &TimeSeriesLink) -> Result<Box<dyn TimeSeriesFile>> {
            let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            Ok(Box::new(MemoryTimeSeriesFile::new().with_series("KW1", "Q", vec![(t, 2.0)])))
        }
    }

    #[test]
    fn test_timeseries_needs_link_and_parameter() {
        let mut r = resolver();
        assert!(r.timeseries(&OneFile, "KW1", None, None).unwrap().is_empty());

        r.timeseries = Some(TimeSeriesLink { path: "q.json".into(), parameter: None });
        assert!(r.timeseries(&OneFile, "KW1", None, None).unwrap().is_empty());

        r.timeseries = Some(TimeSeriesLink { path: "q.json".into(), parameter: Some("Q".into()) });
        assert_eq!(r.timeseries(&OneFile, "KW1", None, None).unwrap().len(), 1);
    }
}
