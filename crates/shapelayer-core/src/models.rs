pub mod color;
pub mod crs;
pub mod feature;
pub mod layer;
pub mod legend;
pub mod shape;
pub mod template;

pub use color::Color;
pub use crs::{detect_prj, DISPLAY_CRS, UNKNOWN_PRJ};
pub use feature::{
    format_number, format_value, value_as_f64, value_key, Attributes, Identifier, NOT_PRESENT,
};
pub use layer::{DisplayField, LayerArguments, TreeItem};
pub use legend::{
    ClassLegend, GradientLegend, LegendClassEntry, LegendDefinition, LegendKind, PointLegend,
};
pub use shape::{check_extension_or_error, Shape, ShapeFiles, ShapeId, TimeSeriesLink};
pub use template::{FieldType, ShapeField, ShapeTemplate};
