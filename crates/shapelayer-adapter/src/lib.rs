//! Shapelayer Adapter - One shapefile served as an interactive map layer
//!
//! [`ShapeLayerAdapter`] is built per request from [`LayerArguments`]. It
//! resolves the dataset, binds the legend and answers the layer, legend,
//! extent, search, location, popup and time-series image operations.
//!
//! [`LayerArguments`]: shapelayer_core::models::LayerArguments

pub mod adapter;
pub mod graph;
pub mod popup;
pub mod reference;
pub mod resolver;

pub use adapter::{RenderLayer, ShapeLayerAdapter};
pub use graph::{line_colors, Graph};
pub use popup::{image_url, PopupContent};
pub use reference::{resolve_reference, ResolvedShape, ShapeReference};
pub use resolver::{FeatureRecord, FeatureResolver, FieldValue, Resolved};
