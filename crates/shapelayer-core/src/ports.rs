//! Port trait definitions
//!
//! These traits define the collaborators an adapter depends on: the
//! registry of uploaded shapes and legends, and the time-series reader.

pub mod catalog;
pub mod timeseries;

pub use catalog::ShapeCatalog;
pub use timeseries::{TimeSeriesFile, TimeSeriesPoint, TimeSeriesProvider};
