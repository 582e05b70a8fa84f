//! Shapelayer Geo - Projection, feature access and spatial search
//!
//! This crate reads shapefile features, converts coordinates between a
//! dataset's native CRS and the display CRS, and resolves query points to
//! nearby features.

pub mod projector;
pub mod search;
pub mod store;

pub use projector::{CoordinateProjector, Extent};
pub use search::{SearchResult, SpatialSearch};
pub use store::{Feature, FeatureStore, OpenStore};
