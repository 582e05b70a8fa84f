use crate::error::Result;
use crate::models::{LegendDefinition, LegendKind, Shape, ShapeId};

/// Port for the persisted shape and legend records
pub trait ShapeCatalog {
    /// Look up a shape by its unique slug
    fn shape_by_slug(&self, slug: &str) -> Result<Option<Shape>>;

    /// Look up a shape by id
    fn shape_by_id(&self, id: ShapeId) -> Result<Option<Shape>>;

    /// Look up a legend of the given variant by id
    fn legend(&self, kind: LegendKind, id: u64) -> Result<Option<LegendDefinition>>;

    /// List all registered shapes
    fn shapes(&self) -> Result<Vec<Shape>>;
}
