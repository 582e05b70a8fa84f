//! Error types for shapelayer

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShapeLayerError {
    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Shape not found: {reference}")]
    ShapeNotFound { reference: String },

    #[error("Legend {kind} with id {id} not found")]
    LegendNotFound { kind: String, id: u64 },

    #[error("Path {path} rejected: {reason}")]
    PathRejected { path: PathBuf, reason: String },

    // Registration errors
    #[error("Invalid shape upload: {0}")]
    ShapeName(String),

    // Dataset errors
    #[error("Dataset unavailable at {path}: {reason}")]
    DatasetUnavailable { path: PathBuf, reason: String },

    #[error("Field \"{field}\" not present. Available fields: {available:?}")]
    FieldMissing { field: String, available: Vec<String> },

    // Projection errors
    #[error("Projection error: {reason}")]
    Projection { reason: String },

    #[error("Coordinate ({x}, {y}) is not representable in the target CRS")]
    CoordinateNotRepresentable { x: f64, y: f64 },

    // Collaborator errors
    #[error("Time series error: {0}")]
    TimeSeries(String),

    #[error("Rendering error: {0}")]
    Render(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ShapeLayerError {
    /// True for failures caught at the dataset boundary and degraded to an
    /// empty result instead of surfacing to the caller.
    pub fn is_resource(&self) -> bool {
        matches!(
            self,
            ShapeLayerError::DatasetUnavailable { .. }
                | ShapeLayerError::Projection { .. }
                | ShapeLayerError::CoordinateNotRepresentable { .. }
                | ShapeLayerError::TimeSeries(_)
                | ShapeLayerError::Io(_)
        )
    }
}

impl From<serde_json::Error> for ShapeLayerError {
    fn from(err: serde_json::Error) -> Self {
        ShapeLayerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShapeLayerError>;
