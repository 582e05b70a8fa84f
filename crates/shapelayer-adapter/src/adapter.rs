//! The layer adapter: one request's view on one shapefile

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shapelayer_core::config::AdapterConfig;
use shapelayer_core::models::{
    Color, DisplayField, Identifier, LayerArguments, LegendDefinition, Shape, TimeSeriesLink,
};
use shapelayer_core::ports::{ShapeCatalog, TimeSeriesPoint, TimeSeriesProvider};
use shapelayer_core::{Result, ShapeLayerError};
use shapelayer_geo::{CoordinateProjector, Extent, FeatureStore, SearchResult, SpatialSearch};
use shapelayer_legend::{default_style, legend_swatches, style_for, IconStyle, LegendSwatch, Style};
use tracing::Span;

use crate::graph::{line_colors, Graph, NO_DATA};
use crate::popup::{image_url, PopupContent};
use crate::reference::{resolve_reference, ResolvedShape, ShapeReference};
use crate::resolver::{FeatureResolver, Resolved};

/// A datasource handed to the tile renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLayer {
    pub name: String,
    /// Native CRS definition of the datasource
    pub crs: String,
    pub datasource: PathBuf,
    /// Names of the styles to draw, keys of the accompanying style map
    pub styles: Vec<String>,
}

pub struct ShapeLayerAdapter<'a> {
    args: LayerArguments,
    config: AdapterConfig,
    shape: ResolvedShape,
    legend: Option<LegendDefinition>,
    display_fields: Vec<DisplayField>,
    timeseries: &'a dyn TimeSeriesProvider,
    span: Span,
}

impl<'a> ShapeLayerAdapter<'a> {
    /// Resolve the dataset and bind the legend.
    ///
    /// Fails when the arguments name no dataset, an unknown dataset or an
    /// unknown legend. Problems with the dataset files themselves only show
    /// up in the individual operations.
    pub fn new(
        args: LayerArguments,
        catalog: &dyn ShapeCatalog,
        timeseries: &'a dyn TimeSeriesProvider,
        config: AdapterConfig,
    ) -> Result<Self> {
        let span = tracing::info_span!("shape_layer", layer = %args.layer_name);
        let (shape, legend) = span.in_scope(|| -> Result<_> {
            let reference = ShapeReference::from_args(&args)?;
            let shape = resolve_reference(&reference, catalog, &config)?;
            let legend = bind_legend(&args, catalog)?;
            tracing::debug!(
                path = %shape.shp_path.display(),
                prj = %shape.prj,
                legend = ?legend.as_ref().map(|l| l.id()),
                "Adapter ready"
            );
            Ok((shape, legend))
        })?;
        let display_fields = args.effective_display_fields();

        Ok(Self { args, config, shape, legend, display_fields, timeseries, span })
    }

    pub fn args(&self) -> &LayerArguments {
        &self.args
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.shape.as_ref()
    }

    pub fn shp_path(&self) -> &Path {
        &self.shape.shp_path
    }

    pub fn native_crs(&self) -> &str {
        &self.shape.prj
    }

    pub fn legend_definition(&self) -> Option<&LegendDefinition> {
        self.legend.as_ref()
    }

    /// Field the legend classifies, from the arguments or else the legend.
    pub fn value_field(&self) -> Option<&str> {
        self.args
            .value_field
            .as_deref()
            .or_else(|| self.legend.as_ref().map(|l| l.value_field()))
    }

    /// Style key, unique per file, legend and value field.
    pub fn style_name(&self) -> String {
        format!(
            "Area style {}::{}::{}",
            self.shape.shp_path.display(),
            self.legend.as_ref().map(|l| l.id().to_string()).unwrap_or_default(),
            self.value_field().unwrap_or_default()
        )
    }

    pub fn style(&self) -> Style {
        match &self.legend {
            Some(legend) => style_for(legend, self.value_field().unwrap_or_default()),
            None => default_style(),
        }
    }

    /// The datasource and its named style.
    pub fn layer(&self) -> (Vec<RenderLayer>, BTreeMap<String, Style>) {
        let _entered = self.span.enter();
        let name = self.style_name();
        tracing::debug!(style = %name, "Building layer");

        let layer = RenderLayer {
            name: self.args.layer_name.clone(),
            crs: self.shape.prj.clone(),
            datasource: self.shape.shp_path.clone(),
            styles: vec![name.clone()],
        };
        let mut styles = BTreeMap::new();
        styles.insert(name, self.style());
        (vec![layer], styles)
    }

    /// Legend panel rows; empty without a legend.
    pub fn legend(&self) -> Vec<LegendSwatch> {
        self.legend.as_ref().map(legend_swatches).unwrap_or_default()
    }

    /// Icon style of a point legend.
    pub fn symbol_style(&self) -> Option<IconStyle> {
        match &self.legend {
            Some(LegendDefinition::Point(point)) => Some(IconStyle::for_point_legend(point)),
            _ => None,
        }
    }

    /// Dataset extent in display coordinates, `None` when unavailable.
    pub fn extent(&self) -> Option<Extent> {
        let _entered = self.span.enter();
        let result = self
            .store()
            .extent()
            .and_then(|native| self.projector()?.extent_to_display(&native));
        match result {
            Ok(extent) => Some(extent),
            Err(e) => {
                tracing::warn!(error = %e, "No extent available");
                None
            }
        }
    }

    /// Features near display point `(x, y)`; empty when the dataset or its
    /// projection is unavailable.
    pub fn search(&self, x: f64, y: f64, radius: Option<f64>) -> Vec<SearchResult> {
        let _entered = self.span.enter();
        let result = self
            .projector()
            .and_then(|projector| self.searcher().search(&self.store(), &projector, x, y, radius));
        match result {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "Search failed, returning no results");
                Vec::new()
            }
        }
    }

    pub fn searcher(&self) -> SpatialSearch {
        SpatialSearch {
            name_field: self.args.search_property_name.clone(),
            id_field: self.args.search_property_id.clone(),
            first_display_field: self.display_fields.first().cloned(),
            radius_damping: self.config.radius_damping,
            max_results: self.config.max_search_results,
        }
    }

    pub fn resolver(&self) -> FeatureResolver {
        FeatureResolver {
            store: self.store(),
            id_field: self.args.search_property_id.clone(),
            name_field: self.args.search_property_name.clone(),
            value_field: self.value_field().map(str::to_string),
            value_name: self.args.value_name.clone(),
            display_fields: self.display_fields.clone(),
            timeseries: self.timeseries_link().cloned(),
        }
    }

    /// Records of the identified features. An unavailable dataset resolves
    /// to an empty list.
    pub fn location(&self, identifiers: &[Identifier], force_list: bool) -> Result<Resolved> {
        let _entered = self.span.enter();
        match self.resolver().resolve(identifiers, force_list) {
            Err(e) if e.is_resource() => {
                tracing::warn!(error = %e, "Cannot resolve locations");
                Ok(Resolved::Many(Vec::new()))
            }
            other => other,
        }
    }

    /// Series of the linked parameter at one location.
    pub fn timeseries(
        &self,
        location: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeSeriesPoint>> {
        self.resolver().timeseries(self.timeseries, location, start, end)
    }

    pub fn popup(&self, identifiers: &[Identifier], add_snippet: bool) -> Result<PopupContent> {
        let mut display_group = self.location(identifiers, true)?.into_vec();
        let _entered = self.span.enter();
        if display_group.len() > self.config.max_popup_results {
            tracing::warn!(
                found = display_group.len(),
                max = self.config.max_popup_results,
                "Too many features for one popup, showing the first"
            );
            display_group.truncate(self.config.max_popup_results);
        }

        let (image_url, timeseries_start) = match self.timeseries_link() {
            Some(link) => {
                let start = match self.timeseries.open(link) {
                    Ok(file) => file.dtstart(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Cannot open time series file");
                        None
                    }
                };
                (Some(image_url(&self.config.image_url_base, identifiers)?), start)
            }
            None => (None, None),
        };

        Ok(PopupContent {
            display_group,
            add_snippet,
            symbol: self.symbol_style(),
            image_url,
            timeseries_start,
        })
    }

    /// PNG graph of the linked parameter for each identified location.
    pub fn image(
        &self,
        identifiers: &[Identifier],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        self.graph(identifiers, start, end, width, height, Utc::now()).png()
    }

    /// Graph for [`image`](Self::image), with an explicit "today".
    pub fn graph(
        &self,
        identifiers: &[Identifier],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        width: u32,
        height: u32,
        today: DateTime<Utc>,
    ) -> Graph {
        let _entered = self.span.enter();
        let mut graph = Graph::new(start, end, width, height, today);

        let Some(link) = self.timeseries_link() else {
            tracing::debug!("Shapefile does not have an associated time series file");
            graph.suptitle(NO_DATA);
            return graph;
        };
        let Some(parameter) = link.parameter.as_deref() else {
            tracing::warn!(path = %link.path.display(), "Time series link has no parameter");
            graph.suptitle(NO_DATA);
            return graph;
        };
        let file = match self.timeseries.open(link) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot open time series file");
                graph.suptitle(NO_DATA);
                return graph;
            }
        };

        graph.set_ylabel(parameter);
        let locations = file.locations();
        let colors = line_colors(identifiers);
        let mut location_count = 0;

        for identifier in identifiers {
            let location = identifier.key();
            if !locations.contains(&location) {
                tracing::debug!(location = %location, "Location not in time series file");
                continue;
            }
            location_count += 1;

            match file.get_timeseries(&location, parameter, Some(start), Some(end)) {
                Ok(points) => {
                    let color = colors.get(&location).copied().unwrap_or(Color::BLACK);
                    graph.plot(points, color);
                }
                Err(e) => {
                    tracing::error!(
                        parameter,
                        choices = ?file.parameters(),
                        error = %e,
                        "Parameter not in time series file"
                    );
                }
            }
        }

        graph.suptitle(format!("{} ({} locations)", parameter, location_count));
        graph
    }

    fn timeseries_link(&self) -> Option<&TimeSeriesLink> {
        self.shape.shape.as_ref().and_then(|s| s.timeseries.as_ref())
    }

    fn store(&self) -> FeatureStore {
        FeatureStore::new(&self.shape.shp_path)
    }

    fn projector(&self) -> Result<CoordinateProjector> {
        CoordinateProjector::new(&self.shape.prj)
    }
}

fn bind_legend(
    args: &LayerArguments,
    catalog: &dyn ShapeCatalog,
) -> Result<Option<LegendDefinition>> {
    let Some(id) = args.legend_id else {
        return Ok(None);
    };
    let kind = args
        .legend_type
        .ok_or_else(|| ShapeLayerError::ConfigMissing { key: "legend_type".to_string() })?;
    match catalog.legend(kind, id)? {
        Some(legend) => Ok(Some(legend)),
        None => Err(ShapeLayerError::LegendNotFound { kind: kind.to_string(), id }),
    }
}
