use super::Session;
use crate::cli::CheckArgs;
use crate::output::OutputWriter;
use crate::output_types::CheckOutput;
use anyhow::{Context, Result};
use shapelayer_core::ports::ShapeCatalog;

/// Re-detect the projection of a registered shape
pub fn execute(args: &CheckArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let mut shape = session
        .catalog
        .shape_by_slug(&args.slug)?
        .with_context(|| format!("No shape registered as '{}'", args.slug))?;

    let changed = shape.refresh_prj();
    let result = CheckOutput {
        slug: shape.slug.clone(),
        shp: shape.files.shp.clone(),
        prj_file: shape.files.prj.clone(),
        prj: shape.prj.clone(),
        changed,
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section(format!("Shape {}", shape.name));
    output.kv("Shapefile", result.shp.display());
    output.kv("Projection file", result.prj_file.display());
    output.kv("Native CRS", &result.prj);
    if shape.files.shp.exists() {
        output.success("Shapefile present");
    } else {
        output.warning(format!("Shapefile missing: {}", result.shp.display()));
    }
    if changed {
        output.warning("Detected projection differs from the registered one");
    }
    Ok(())
}
