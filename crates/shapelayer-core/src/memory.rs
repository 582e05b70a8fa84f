//! In-memory implementations of the ports, for the CLI and for tests.
//!
//! The catalog is loaded from a TOML file listing templates (with their
//! fields and legends) and shapes; time series are loaded from JSON files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShapeLayerError};
use crate::models::{
    LegendDefinition, LegendKind, Shape, ShapeFiles, ShapeId, ShapeTemplate, TimeSeriesLink,
};
use crate::ports::{ShapeCatalog, TimeSeriesFile, TimeSeriesPoint, TimeSeriesProvider};

/// In-memory implementation of ShapeCatalog
#[derive(Debug, Clone, Default)]
pub struct MemoryShapeCatalog {
    shapes: BTreeMap<ShapeId, Shape>,
    slugs: HashMap<String, ShapeId>,
}

impl MemoryShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape; the slug must be unique.
    pub fn insert(&mut self, shape: Shape) -> Result<()> {
        if let Some(existing) = self.slugs.get(&shape.slug) {
            if *existing != shape.id {
                return Err(ShapeLayerError::ConfigInvalid {
                    key: "slug".to_string(),
                    reason: format!("Slug {} is already used by shape {}", shape.slug, existing),
                });
            }
        }
        self.slugs.insert(shape.slug.clone(), shape.id);
        self.shapes.insert(shape.id, shape);
        Ok(())
    }

    /// Load a catalog file. Relative shape paths resolve against the
    /// directory containing the catalog.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ShapeLayerError::ConfigInvalid {
            key: "catalog".to_string(),
            reason: format!("Failed to read catalog {}: {}", path.display(), e),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&content, base)
    }

    pub fn from_toml(content: &str, base: &Path) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| {
            ShapeLayerError::ConfigInvalid {
                key: "catalog".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            }
        })?;

        let templates: HashMap<u64, ShapeTemplate> = file
            .templates
            .into_iter()
            .map(|mut t| {
                t.fields.sort_by_key(|f| f.index);
                for legend in &mut t.legends {
                    if let LegendDefinition::Class(class) = legend {
                        class.sort_classes();
                    }
                }
                (t.id, t)
            })
            .collect();

        let mut catalog = Self::new();
        for entry in file.shapes {
            let template = templates.get(&entry.template).cloned().ok_or_else(|| {
                ShapeLayerError::ConfigInvalid {
                    key: "template".to_string(),
                    reason: format!("Shape {} refers to unknown template {}", entry.slug, entry.template),
                }
            })?;

            let files = match entry.files {
                Some(files) => ShapeFiles {
                    shp: resolve(base, &files.shp),
                    dbf: resolve(base, &files.dbf),
                    shx: resolve(base, &files.shx),
                    prj: resolve(base, &files.prj),
                },
                None => ShapeFiles::from_shp(resolve(base, &entry.shp_file)),
            };

            let mut shape =
                Shape::register(ShapeId(entry.id), entry.name, entry.slug, files, template)?;
            shape.description = entry.description;
            shape.timeseries = entry.timeseries.map(|mut link| {
                link.path = resolve(base, &link.path);
                link
            });
            catalog.insert(shape)?;
        }

        tracing::debug!(shapes = catalog.shapes.len(), "Loaded shape catalog");
        Ok(catalog)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl ShapeCatalog for MemoryShapeCatalog {
    fn shape_by_slug(&self, slug: &str) -> Result<Option<Shape>> {
        Ok(self.slugs.get(slug).and_then(|id| self.shapes.get(id)).cloned())
    }

    fn shape_by_id(&self, id: ShapeId) -> Result<Option<Shape>> {
        Ok(self.shapes.get(&id).cloned())
    }

    fn legend(&self, kind: LegendKind, id: u64) -> Result<Option<LegendDefinition>> {
        Ok(self
            .shapes
            .values()
            .flat_map(|s| s.template.legends.iter())
            .find(|l| l.kind() == kind && l.id() == id)
            .cloned())
    }

    fn shapes(&self) -> Result<Vec<Shape>> {
        Ok(self.shapes.values().cloned().collect())
    }
}

/// Catalog file layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<ShapeTemplate>,
    #[serde(default)]
    shapes: Vec<CatalogShape>,
}

#[derive(Debug, Deserialize)]
struct CatalogShape {
    id: u64,
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    /// Path of the .shp file; the other components share its base
    #[serde(default)]
    shp_file: PathBuf,
    /// Explicit component paths, overriding `shp_file`
    #[serde(default)]
    files: Option<ShapeFiles>,
    template: u64,
    #[serde(default)]
    timeseries: Option<TimeSeriesLink>,
}

/// Time series held in memory: location -> parameter -> points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryTimeSeriesFile {
    #[serde(default)]
    series: BTreeMap<String, BTreeMap<String, Vec<TimeSeriesPoint>>>,
}

impl MemoryTimeSeriesFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series; points are kept ordered by timestamp.
    pub fn with_series(
        mut self,
        location: impl Into<String>,
        parameter: impl Into<String>,
        mut points: Vec<TimeSeriesPoint>,
    ) -> Self {
        points.sort_by_key(|(t, _)| *t);
        self.series.entry(location.into()).or_default().insert(parameter.into(), points);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut file: MemoryTimeSeriesFile = serde_json::from_str(json)
            .map_err(|e| ShapeLayerError::TimeSeries(format!("Invalid time series file: {}", e)))?;
        for parameters in file.series.values_mut() {
            for points in parameters.values_mut() {
                points.sort_by_key(|(t, _)| *t);
            }
        }
        Ok(file)
    }
}

impl TimeSeriesFile for MemoryTimeSeriesFile {
    fn parameters(&self) -> Vec<String> {
        let mut parameters: Vec<String> =
            self.series.values().flat_map(|p| p.keys().cloned()).collect();
        parameters.sort();
        parameters.dedup();
        parameters
    }

    fn locations(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    fn get_timeseries(
        &self,
        location: &str,
        parameter: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let points = self
            .series
            .get(location)
            .and_then(|p| p.get(parameter))
            .ok_or_else(|| {
                ShapeLayerError::TimeSeries(format!(
                    "No series for parameter {} at location {}",
                    parameter, location
                ))
            })?;

        Ok(points
            .iter()
            .filter(|(t, _)| start.map_or(true, |s| *t >= s) && end.map_or(true, |e| *t <= e))
            .copied()
            .collect())
    }

    fn dtstart(&self) -> Option<DateTime<Utc>> {
        self.series
            .values()
            .flat_map(|p| p.values())
            .filter_map(|points| points.first().map(|(t, _)| *t))
            .min()
    }
}

/// Opens linked time-series files as JSON from disk.
#[derive(Debug, Clone)]
pub struct FileTimeSeriesProvider {
    root: PathBuf,
}

impl FileTimeSeriesProvider {
    /// Relative link paths resolve against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TimeSeriesProvider for FileTimeSeriesProvider {
    fn open(&self, link: &TimeSeriesLink) -> Result<Box<dyn TimeSeriesFile>> {
        let path = resolve(&self.root, &link.path);
        let content = fs::read_to_string(&path).map_err(|e| {
            ShapeLayerError::TimeSeries(format!("Cannot open {}: {}", path.display(), e))
        })?;
        Ok(Box::new(MemoryTimeSeriesFile::from_json(&content)?))
    }
}
