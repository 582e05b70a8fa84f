//! Resolving the one shapefile a layer shows

use std::path::{Component, Path, PathBuf};

use shapelayer_core::config::AdapterConfig;
use shapelayer_core::models::{detect_prj, LayerArguments, Shape, ShapeId, UNKNOWN_PRJ};
use shapelayer_core::ports::ShapeCatalog;
use shapelayer_core::{Result, ShapeLayerError};

/// Where a layer's dataset comes from, highest priority first.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeReference {
    Slug(String),
    Id(ShapeId),
    /// Dataset bundled under a configured resource root
    Resource { module: String, name: String },
    /// Filesystem path, confined to the data root unless trusted
    RawPath(PathBuf),
}

impl ShapeReference {
    /// Pick the highest-priority reference the arguments carry.
    pub fn from_args(args: &LayerArguments) -> Result<Self> {
        if let Some(slug) = non_blank(&args.shape_slug) {
            return Ok(ShapeReference::Slug(slug.to_string()));
        }
        if let Some(id) = args.shape_id {
            return Ok(ShapeReference::Id(id));
        }
        match (non_blank(&args.resource_module), non_blank(&args.resource_name)) {
            (Some(module), Some(name)) => {
                return Ok(ShapeReference::Resource {
                    module: module.to_string(),
                    name: name.to_string(),
                })
            }
            (Some(_), None) if non_blank(&args.layer_filename).is_none() => {
                return Err(ShapeLayerError::ConfigMissing { key: "resource_name".to_string() })
            }
            (None, Some(_)) if non_blank(&args.layer_filename).is_none() => {
                return Err(ShapeLayerError::ConfigMissing { key: "resource_module".to_string() })
            }
            _ => {}
        }
        if let Some(path) = non_blank(&args.layer_filename) {
            return Ok(ShapeReference::RawPath(PathBuf::from(path)));
        }
        Err(ShapeLayerError::ConfigMissing {
            key: "shape_slug, shape_id, resource_module + resource_name or layer_filename"
                .to_string(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The dataset a layer is bound to.
#[derive(Debug, Clone)]
pub struct ResolvedShape {
    /// Catalog record, absent for resource and raw-path datasets
    pub shape: Option<Shape>,
    pub shp_path: PathBuf,
    /// Native CRS definition
    pub prj: String,
}

pub fn resolve_reference(
    reference: &ShapeReference,
    catalog: &dyn ShapeCatalog,
    config: &AdapterConfig,
) -> Result<ResolvedShape> {
    match reference {
        ShapeReference::Slug(slug) => {
            let shape = catalog.shape_by_slug(slug)?.ok_or_else(|| {
                ShapeLayerError::ShapeNotFound { reference: format!("slug {}", slug) }
            })?;
            Ok(from_shape(shape))
        }
        ShapeReference::Id(id) => {
            let shape = catalog
                .shape_by_id(*id)?
                .ok_or_else(|| ShapeLayerError::ShapeNotFound { reference: format!("id {}", id) })?;
            Ok(from_shape(shape))
        }
        ShapeReference::Resource { module, name } => {
            let root = config.resource_roots.get(module).ok_or_else(|| {
                ShapeLayerError::ConfigInvalid {
                    key: "resource_module".to_string(),
                    reason: format!("no resource root configured for {}", module),
                }
            })?;
            let name = Path::new(name);
            if !is_plain_relative(name) {
                return Err(ShapeLayerError::PathRejected {
                    path: name.to_path_buf(),
                    reason: "resource names must be relative and stay inside the resource root"
                        .to_string(),
                });
            }
            Ok(from_path(root.join(name)))
        }
        ShapeReference::RawPath(path) => {
            let resolved =
                if path.is_absolute() { path.clone() } else { config.data_root.join(path) };
            if !config.trust_raw_paths {
                let escapes = resolved.components().any(|c| c == Component::ParentDir);
                if escapes || !resolved.starts_with(&config.data_root) {
                    return Err(ShapeLayerError::PathRejected {
                        path: path.clone(),
                        reason: format!("outside data root {}", config.data_root.display()),
                    });
                }
            }
            tracing::warn!(path = %resolved.display(), "Layer uses a raw shapefile path");
            Ok(from_path(resolved))
        }
    }
}

fn from_shape(shape: Shape) -> ResolvedShape {
    ResolvedShape { shp_path: shape.files.shp.clone(), prj: shape.prj.clone(), shape: Some(shape) }
}

fn from_path(shp_path: PathBuf) -> ResolvedShape {
    let prj_path = shp_path.with_extension("prj");
    let prj = match std::fs::read_to_string(&prj_path) {
        Ok(text) => detect_prj(&text),
        Err(e) => {
            tracing::warn!(path = %prj_path.display(), error = %e, "Cannot read projection file");
            UNKNOWN_PRJ.to_string()
        }
    };
    ResolvedShape { shape: None, shp_path, prj }
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().next().is_some()
}
