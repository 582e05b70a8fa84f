//! Shapefile feature access
//!
//! Features are read lazily from the .shp/.dbf pair. Every [`FeatureStore::open`]
//! opens the files anew, so replaced files are picked up by the next
//! operation.

use geo::{
    BoundingRect, Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon, Rect,
};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use shapelayer_core::error::{Result, ShapeLayerError};
use shapelayer_core::models::Attributes;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::projector::Extent;

type ShapefileReader = shapefile::Reader<BufReader<File>, BufReader<File>>;

/// One geometry with its attribute row.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub attributes: Attributes,
}

impl Feature {
    pub fn new(geometry: Option<Geometry<f64>>, attributes: Attributes) -> Self {
        Self { geometry, attributes }
    }

    /// Attribute value of `field`. A missing column is a
    /// [`ShapeLayerError::FieldMissing`] listing the columns that exist.
    pub fn require(&self, field: &str) -> Result<&serde_json::Value> {
        self.attributes.get(field).ok_or_else(|| ShapeLayerError::FieldMissing {
            field: field.to_string(),
            available: self.attributes.keys().cloned().collect(),
        })
    }

    /// Whether the geometry's bounding box touches `bbox`.
    pub fn intersects_bbox(&self, bbox: &Rect<f64>) -> bool {
        match self.geometry.as_ref().and_then(|g| g.bounding_rect()) {
            Some(rect) => bounding_boxes_intersect(&rect, bbox),
            None => false,
        }
    }
}

/// Check if two bounding boxes intersect
pub fn bounding_boxes_intersect(bbox1: &Rect<f64>, bbox2: &Rect<f64>) -> bool {
    let x_overlap = bbox1.min().x <= bbox2.max().x && bbox1.max().x >= bbox2.min().x;
    let y_overlap = bbox1.min().y <= bbox2.max().y && bbox1.max().y >= bbox2.min().y;
    x_overlap && y_overlap
}

/// Handle on a shapefile dataset path.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    path: PathBuf,
}

impl FeatureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the dataset for one scan.
    pub fn open(&self) -> Result<OpenStore> {
        if !self.path.exists() {
            return Err(self.unavailable("file does not exist"));
        }
        let reader = ShapefileReader::from_path(&self.path)
            .map_err(|e| self.unavailable(&format!("Failed to open Shapefile: {}", e)))?;
        Ok(OpenStore { reader, path: self.path.clone() })
    }

    /// Native bounding box from the .shp header, without scanning features.
    pub fn extent(&self) -> Result<Extent> {
        if !self.path.exists() {
            return Err(self.unavailable("file does not exist"));
        }
        let reader = shapefile::ShapeReader::from_path(&self.path)
            .map_err(|e| self.unavailable(&format!("Failed to read header: {}", e)))?;
        let bbox = &reader.header().bbox;
        let extent = Extent::new(bbox.min.x, bbox.min.y, bbox.max.x, bbox.max.y);
        if !(extent.west.is_finite()
            && extent.south.is_finite()
            && extent.east.is_finite()
            && extent.north.is_finite())
            || extent.west > extent.east
            || extent.south > extent.north
        {
            return Err(self.unavailable("header has no valid bounding box"));
        }
        Ok(extent)
    }

    fn unavailable(&self, reason: &str) -> ShapeLayerError {
        ShapeLayerError::DatasetUnavailable { path: self.path.clone(), reason: reason.to_string() }
    }
}

/// An opened dataset, good for one pass over its features.
pub struct OpenStore {
    reader: ShapefileReader,
    path: PathBuf,
}

impl OpenStore {
    /// Lazily read every feature in file order.
    pub fn features(&mut self) -> impl Iterator<Item = Result<Feature>> + '_ {
        let path = self.path.clone();
        self.reader.iter_shapes_and_records().map(move |result| {
            let (shape, record) = result.map_err(|e| ShapeLayerError::DatasetUnavailable {
                path: path.clone(),
                reason: format!("Failed to read feature: {}", e),
            })?;
            Ok(Feature::new(shape_to_geometry(&shape), record_to_attributes(record)))
        })
    }

    /// Features whose bounding box touches `bbox`; features without
    /// geometry are skipped.
    pub fn features_in(&mut self, bbox: Rect<f64>) -> impl Iterator<Item = Result<Feature>> + '_ {
        self.features().filter(move |result| match result {
            Ok(feature) => feature.intersects_bbox(&bbox),
            Err(_) => true,
        })
    }
}

macro_rules! coords {
    ($points:expr) => {
        $points.iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<Coord<f64>>>()
    };
}

macro_rules! line_geometry {
    ($parts:expr) => {{
        let mut lines: Vec<LineString<f64>> =
            $parts.iter().map(|part| LineString::from(coords!(part))).collect();
        if lines.len() == 1 {
            Geometry::LineString(lines.remove(0))
        } else {
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
    }};
}

macro_rules! polygon_geometry {
    ($rings:expr) => {{
        let mut polygons: Vec<Polygon<f64>> = Vec::new();
        for ring in $rings.iter() {
            match ring {
                PolygonRing::Outer(points) => {
                    polygons.push(Polygon::new(LineString::from(coords!(points)), vec![]))
                }
                PolygonRing::Inner(points) => {
                    let hole = LineString::from(coords!(points));
                    match polygons.last_mut() {
                        Some(outer) => outer.interiors_push(hole),
                        None => polygons.push(Polygon::new(hole, vec![])),
                    }
                }
            }
        }
        if polygons.len() == 1 {
            Geometry::Polygon(polygons.remove(0))
        } else {
            Geometry::MultiPolygon(MultiPolygon::new(polygons))
        }
    }};
}

macro_rules! multipoint_geometry {
    ($points:expr) => {
        Geometry::MultiPoint(MultiPoint::new(
            $points.iter().map(|p| Point::new(p.x, p.y)).collect(),
        ))
    };
}

/// Convert a shapefile shape to a 2D geometry; Z and M are dropped.
pub fn shape_to_geometry(shape: &Shape) -> Option<Geometry<f64>> {
    let geometry = match shape {
        Shape::NullShape => return None,
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::Polyline(line) => line_geometry!(line.parts()),
        Shape::PolylineM(line) => line_geometry!(line.parts()),
        Shape::PolylineZ(line) => line_geometry!(line.parts()),
        Shape::Polygon(polygon) => polygon_geometry!(polygon.rings()),
        Shape::PolygonM(polygon) => polygon_geometry!(polygon.rings()),
        Shape::PolygonZ(polygon) => polygon_geometry!(polygon.rings()),
        Shape::Multipoint(points) => multipoint_geometry!(points.points()),
        Shape::MultipointM(points) => multipoint_geometry!(points.points()),
        Shape::MultipointZ(points) => multipoint_geometry!(points.points()),
        Shape::Multipatch(_) => {
            tracing::debug!("Skipping multipatch geometry");
            return None;
        }
    };
    Some(geometry)
}

/// Attribute row with whitespace-stripped column names.
pub fn record_to_attributes(record: Record) -> Attributes {
    record
        .into_iter()
        .map(|(name, value)| (name.trim().to_string(), dbase_to_json(&value)))
        .collect()
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Convert dBase field value to JSON value
fn dbase_to_json(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Character(Some(s)) => serde_json::Value::String(s.trim_end().to_string()),
        FieldValue::Character(None) => serde_json::Value::Null,
        FieldValue::Numeric(Some(n)) => number(*n),
        FieldValue::Numeric(None) => serde_json::Value::Null,
        FieldValue::Logical(Some(b)) => serde_json::Value::Bool(*b),
        FieldValue::Logical(None) => serde_json::Value::Null,
        FieldValue::Date(Some(date)) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        FieldValue::Date(None) => serde_json::Value::Null,
        FieldValue::Float(Some(f)) => number(f64::from(*f)),
        FieldValue::Float(None) => serde_json::Value::Null,
        FieldValue::Integer(i) => serde_json::Value::Number((*i).into()),
        FieldValue::Currency(c) => number(*c),
        FieldValue::DateTime(dt) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            dt.date().year(),
            dt.date().month(),
            dt.date().day()
        )),
        FieldValue::Double(d) => number(*d),
        FieldValue::Memo(s) => serde_json::Value::String(s.clone()),
        #[allow(unreachable_patterns)]
        _ => serde_json::Value::Null,
    }
}
