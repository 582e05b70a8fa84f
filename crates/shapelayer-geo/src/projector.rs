//! Conversion between a dataset's native CRS and the display CRS

use proj::Proj;
use serde::{Deserialize, Serialize};
use shapelayer_core::error::{Result, ShapeLayerError};
use shapelayer_core::models::crs::{is_unknown, DISPLAY_CRS};
use std::fmt;

/// Bounding box as west/south/east/north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.west, self.south),
            (self.west, self.north),
            (self.east, self.south),
            (self.east, self.north),
        ]
    }

    /// Smallest extent containing all given points, `None` when empty.
    pub fn from_points<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Extent>, (x, y)| {
            Some(match acc {
                None => Extent::new(x, y, x, y),
                Some(e) => Extent::new(e.west.min(x), e.south.min(y), e.east.max(x), e.north.max(y)),
            })
        })
    }
}

/// Forward and inverse transforms between one native CRS and [`DISPLAY_CRS`].
pub struct CoordinateProjector {
    native: String,
    forward: Proj,
    inverse: Proj,
}

impl CoordinateProjector {
    /// Build transforms for a native definition (`EPSG:n`, WKT or proj string).
    pub fn new(native: &str) -> Result<Self> {
        if is_unknown(native) {
            return Err(ShapeLayerError::Projection {
                reason: "Native CRS of the dataset is unknown".to_string(),
            });
        }

        let forward = Proj::new_known_crs(native, DISPLAY_CRS, None).map_err(|e| {
            ShapeLayerError::Projection {
                reason: format!(
                    "Failed to create projection from {} to {}: {}",
                    native, DISPLAY_CRS, e
                ),
            }
        })?;
        let inverse = Proj::new_known_crs(DISPLAY_CRS, native, None).map_err(|e| {
            ShapeLayerError::Projection {
                reason: format!(
                    "Failed to create projection from {} to {}: {}",
                    DISPLAY_CRS, native, e
                ),
            }
        })?;

        Ok(Self { native: native.to_string(), forward, inverse })
    }

    pub fn native_crs(&self) -> &str {
        &self.native
    }

    /// Native coordinates to display coordinates.
    pub fn to_display(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        convert(&self.forward, x, y)
    }

    /// Display coordinates to native coordinates.
    pub fn to_native(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        convert(&self.inverse, x, y)
    }

    /// Native extent to display CRS, projecting all four corners.
    pub fn extent_to_display(&self, extent: &Extent) -> Result<Extent> {
        let corners = extent
            .corners()
            .iter()
            .map(|&(x, y)| self.to_display(x, y))
            .collect::<Result<Vec<_>>>()?;
        Extent::from_points(corners).ok_or_else(|| ShapeLayerError::Projection {
            reason: "Empty extent".to_string(),
        })
    }
}

fn convert(proj: &Proj, x: f64, y: f64) -> Result<(f64, f64)> {
    match proj.convert((x, y)) {
        Ok((px, py)) if px.is_finite() && py.is_finite() => Ok((px, py)),
        Ok(_) => Err(ShapeLayerError::CoordinateNotRepresentable { x, y }),
        Err(e) => {
            tracing::debug!(x, y, error = %e, "Coordinate not representable");
            Err(ShapeLayerError::CoordinateNotRepresentable { x, y })
        }
    }
}

impl fmt::Debug for CoordinateProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateProjector")
            .field("native", &self.native)
            .field("display", &DISPLAY_CRS)
            .finish()
    }
}
