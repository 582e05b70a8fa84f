use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::crs::{detect_prj, UNKNOWN_PRJ};
use super::template::ShapeTemplate;
use crate::error::{Result, ShapeLayerError};

/// Unique identifier of a registered shapefile dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four component files of an uploaded shapefile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFiles {
    pub shp: PathBuf,
    pub dbf: PathBuf,
    pub shx: PathBuf,
    pub prj: PathBuf,
}

impl ShapeFiles {
    /// Component paths sharing the base of `shp`.
    pub fn from_shp(shp: impl AsRef<Path>) -> Self {
        let shp = shp.as_ref();
        Self {
            shp: shp.to_path_buf(),
            dbf: shp.with_extension("dbf"),
            shx: shp.with_extension("shx"),
            prj: shp.with_extension("prj"),
        }
    }

    /// Check extensions and the common base name of all four files.
    pub fn validate(&self) -> Result<()> {
        check_extension_or_error(&self.shp, "shp", Some("shp_file"))?;
        check_extension_or_error(&self.dbf, "dbf", Some("dbf_file"))?;
        check_extension_or_error(&self.shx, "shx", Some("shx_file"))?;
        check_extension_or_error(&self.prj, "prj", Some("prj_file"))?;

        let base = self.shp.with_extension("");
        let same_base = [&self.dbf, &self.shx, &self.prj]
            .iter()
            .all(|p| p.with_extension("") == base);
        if !same_base {
            return Err(ShapeLayerError::ShapeName(
                "Uploaded files do not have common filename base.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error unless `path` has extension `ext` (case-insensitive).
///
/// `extension_name` names the upload slot in the error message.
pub fn check_extension_or_error(path: &Path, ext: &str, extension_name: Option<&str>) -> Result<()> {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false);
    if matches {
        return Ok(());
    }
    let slot = extension_name.unwrap_or("file");
    Err(ShapeLayerError::ShapeName(format!(
        "Uploaded {} {} does not have extension .{}.",
        slot,
        path.display(),
        ext
    )))
}

/// Location and parameter of the time series belonging to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesLink {
    pub path: PathBuf,
    #[serde(default)]
    pub parameter: Option<String>,
}

/// A registered shapefile dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub files: ShapeFiles,
    /// Native CRS definition detected from the projection file.
    #[serde(default = "unknown_prj")]
    pub prj: String,
    pub template: ShapeTemplate,
    #[serde(default)]
    pub timeseries: Option<TimeSeriesLink>,
}

fn unknown_prj() -> String {
    UNKNOWN_PRJ.to_string()
}

impl Shape {
    /// Validate the uploaded component files and detect the native CRS.
    pub fn register(
        id: ShapeId,
        name: impl Into<String>,
        slug: impl Into<String>,
        files: ShapeFiles,
        template: ShapeTemplate,
    ) -> Result<Self> {
        files.validate()?;

        let mut shape = Self {
            id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            files,
            prj: unknown_prj(),
            template,
            timeseries: None,
        };
        shape.refresh_prj();

        tracing::debug!(shape = %shape.slug, prj = %shape.prj, "Registered shape");
        Ok(shape)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeseries(mut self, link: TimeSeriesLink) -> Self {
        self.timeseries = Some(link);
        self
    }

    /// Re-read the projection file and re-detect the native CRS.
    ///
    /// Returns true when the stored definition changed.
    pub fn refresh_prj(&mut self) -> bool {
        let detected = match std::fs::read_to_string(&self.files.prj) {
            Ok(text) => detect_prj(&text),
            Err(e) => {
                tracing::warn!(
                    shape = %self.slug,
                    path = %self.files.prj.display(),
                    error = %e,
                    "Cannot read projection file"
                );
                unknown_prj()
            }
        };
        let changed = detected != self.prj;
        self.prj = detected;
        changed
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
