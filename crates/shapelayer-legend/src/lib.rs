//! Shapelayer Legend - Render styles and legend swatches from legend definitions
//!
//! A legend definition (gradient, point icon or discrete classes) is turned
//! into a [`Style`]: an ordered list of filtered rules the tile renderer
//! draws, and into legend swatches for the map legend panel.

pub mod classify;
pub mod filter;
pub mod gradient;
pub mod style;
pub mod swatch;

pub use classify::{default_style, legend_swatches, style_for};
pub use filter::{Comparison, Filter, FilterValue};
pub use gradient::{GradientBucket, GradientScale};
pub use style::{Rule, Style, Symbolizer};
pub use swatch::{IconStyle, LegendSwatch};
