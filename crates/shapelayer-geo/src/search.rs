//! Proximity search of features around a display-coordinate query point

use geo::{CoordsIter, Distance, Euclidean, Geometry, Point, Rect};
use serde::Serialize;
use shapelayer_core::error::Result;
use shapelayer_core::models::{format_value, DisplayField, Identifier};

use crate::projector::CoordinateProjector;
use crate::store::{Feature, FeatureStore};

/// A feature near the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Distance in native CRS units
    pub distance: f64,
    pub name: String,
    /// First vertex in display coordinates, when representable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
}

/// Search settings for one layer.
#[derive(Debug, Clone)]
pub struct SpatialSearch {
    /// Field used for result names; search is disabled without it
    pub name_field: Option<String>,
    pub id_field: Option<String>,
    /// Appended to names as `" - <name>=<value>"`
    pub first_display_field: Option<DisplayField>,
    pub radius_damping: f64,
    pub max_results: usize,
}

impl SpatialSearch {
    /// Features around display point `(x, y)`, nearest first.
    ///
    /// `radius` is in display units. Without a radius every feature is a
    /// candidate and only the result cap applies.
    pub fn search(
        &self,
        store: &FeatureStore,
        projector: &CoordinateProjector,
        x: f64,
        y: f64,
        radius: Option<f64>,
    ) -> Result<Vec<SearchResult>> {
        tracing::debug!(x, y, ?radius, "Searching coordinates");

        if self.name_field().is_none() {
            return Ok(Vec::new());
        }

        let (qx, qy) = projector.to_native(x, y)?;
        let native_radius = radius.map(|r| self.native_radius(projector, x, y, (qx, qy), r));

        let mut open = store.open()?;
        let features: Box<dyn Iterator<Item = Result<Feature>> + '_> = match native_radius {
            Some(r) => Box::new(open.features_in(Rect::new((qx - r, qy - r), (qx + r, qy + r)))),
            None => Box::new(open.features()),
        };

        let results = self.scan(features, Point::new(qx, qy), native_radius, |cx, cy| {
            projector.to_display(cx, cy)
        });
        Ok(self.rank(results))
    }

    /// Radius in native units: damped, then approximated by projecting the
    /// diagonal offset and taking the larger axis delta.
    fn native_radius(
        &self,
        projector: &CoordinateProjector,
        x: f64,
        y: f64,
        native: (f64, f64),
        radius: f64,
    ) -> f64 {
        let damped = radius * self.radius_damping;
        match projector.to_native(x + damped, y + damped) {
            Ok((ox, oy)) => (ox - native.0).abs().max((oy - native.1).abs()),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot project search radius, using display units");
                damped
            }
        }
    }

    fn name_field(&self) -> Option<&str> {
        self.name_field.as_deref().filter(|f| !f.trim().is_empty())
    }

    /// Collect results from a feature sequence in scan order.
    ///
    /// A missing name or first display field is a layer misconfiguration:
    /// it is logged once and the scan stops with what was found so far.
    pub fn scan<I, P>(
        &self,
        features: I,
        query: Point<f64>,
        radius: Option<f64>,
        to_display: P,
    ) -> Vec<SearchResult>
    where
        I: Iterator<Item = Result<Feature>>,
        P: Fn(f64, f64) -> Result<(f64, f64)>,
    {
        let mut results = Vec::new();
        let Some(name_field) = self.name_field() else {
            return results;
        };
        let query = Geometry::Point(query);

        for feature in features {
            let feature = match feature {
                Ok(feature) => feature,
                Err(e) => {
                    tracing::error!(error = %e, "Search: stopped reading dataset");
                    break;
                }
            };
            let Some(geometry) = feature.geometry.as_ref() else {
                continue;
            };

            let distance = Euclidean.distance(&query, geometry);
            if let Some(r) = radius {
                if distance >= r {
                    continue;
                }
            }

            let name_value = match feature.require(name_field) {
                Ok(value) => value,
                Err(e) => {
                    tracing::error!(error = %e, "Search: the name field cannot be found in the shapefile");
                    break;
                }
            };
            let mut name = format_value(name_value);

            if let Some(display) = &self.first_display_field {
                let value = match feature.require(&display.field) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!(error = %e, "Search: the display field cannot be found in the shapefile");
                        break;
                    }
                };
                name.push_str(&format!(" - {}={}", display.name, format_value(value)));
            }

            let coordinates = geometry.coords_iter().next().and_then(|c| {
                match to_display(c.x, c.y) {
                    Ok(xy) => Some(xy),
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring coordinates of search result");
                        None
                    }
                }
            });

            let identifier = match self.id_field.as_deref() {
                Some(id_field) if !id_field.is_empty() => match feature.require(id_field) {
                    Ok(id) => Some(Identifier::new(id.clone())),
                    Err(e) => {
                        tracing::error!(error = %e, "Search: id field not available");
                        None
                    }
                },
                _ => {
                    tracing::error!("Search: no id field configured");
                    None
                }
            };

            results.push(SearchResult { distance, name, coordinates, identifier });
        }

        results
    }

    /// Stable sort by distance, then cap.
    pub fn rank(&self, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        if results.len() > self.max_results {
            tracing::warn!(
                found = results.len(),
                max = self.max_results,
                "A lot of results found, just taking the nearest"
            );
            results.truncate(self.max_results);
        }
        results
    }
}
