//! Integration tests for the layer adapter against real shapefiles
//!
//! This test suite verifies that:
//! - Layers carry the native CRS and a style keyed by file, legend and field
//! - Class legends draw exactly the matching features
//! - Search results are sorted, capped and monotonic in the radius
//! - Missing display fields resolve to a placeholder
//! - Missing datasets and missing time series degrade instead of failing

mod common;

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use common::*;
use shapelayer_adapter::{Resolved, ShapeLayerAdapter};
use shapelayer_core::models::{Color, Identifier, LayerArguments, LegendKind, NOT_PRESENT};
use shapelayer_core::ShapeLayerError;
use shapelayer_geo::{CoordinateProjector, FeatureStore};
use shapelayer_legend::Symbolizer;

fn adapter<'a>(fixture: &'a Fixture, args: LayerArguments) -> ShapeLayerAdapter<'a> {
    ShapeLayerAdapter::new(args, &fixture.catalog, &fixture.provider, fixture.config.clone())
        .unwrap()
}

fn display(x: f64, y: f64) -> (f64, f64) {
    CoordinateProjector::new("EPSG:28992").unwrap().to_display(x, y).unwrap()
}

fn ids(results: &[shapelayer_geo::SearchResult]) -> BTreeSet<String> {
    results.iter().filter_map(|r| r.identifier.as_ref()).map(|i| i.key()).collect()
}

fn text_chunks(bytes: &[u8]) -> Vec<(String, String)> {
    let reader = png::Decoder::new(bytes).read_info().unwrap();
    reader
        .info()
        .uncompressed_latin1_text
        .iter()
        .map(|c| (c.keyword.clone(), c.text.clone()))
        .collect()
}

fn title(bytes: &[u8]) -> Option<String> {
    text_chunks(bytes).into_iter().find(|(k, _)| k == "Title").map(|(_, t)| t)
}

#[test]
fn test_layer_uses_native_crs_and_named_style() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    let (layers, styles) = adapter.layer();

    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].crs, "EPSG:28992");
    assert_eq!(layers[0].datasource, shp_path(fixture.root()));

    let expected = format!("Area style {}::1::PEIL", shp_path(fixture.root()).display());
    assert_eq!(layers[0].styles, vec![expected.clone()]);
    assert!(styles.contains_key(&expected));
}

#[test]
fn test_exact_class_draws_red_only_for_matching_feature() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    let (_, styles) = adapter.layer();
    let style = styles.values().next().unwrap();

    let mut open = FeatureStore::new(shp_path(fixture.root())).open().unwrap();
    let features: Vec<_> = open.features().map(|f| f.unwrap()).collect();
    let by_id = |id: &str| {
        features
            .iter()
            .find(|f| f.require("KWKIDENT").ok() == Some(&serde_json::json!(id)))
            .unwrap()
    };

    let red = Symbolizer::Line { color: Color::rgb(255, 0, 0), width: 1.0 };
    assert_eq!(style.symbolizers_for(&by_id("KW1").attributes), vec![&red]);
    assert!(style.symbolizers_for(&by_id("KW2").attributes).is_empty());
    assert_eq!(
        style.symbolizers_for(&by_id("KW5").attributes),
        vec![&Symbolizer::Polygon { fill: Color::rgb(0, 255, 0), opacity: 0.5 }]
    );
}

#[test]
fn test_layer_without_legend_uses_default_style() {
    let fixture = fixture();
    let args = LayerArguments {
        layer_name: "Kunstwerken".to_string(),
        shape_slug: Some("kunstwerken".to_string()),
        ..Default::default()
    };
    let adapter = adapter(&fixture, args);
    let (layers, styles) = adapter.layer();
    assert!(layers[0].styles[0].ends_with("::::"));
    assert_eq!(styles.values().next().unwrap().rules.len(), 1);
    assert!(adapter.legend().is_empty());
}

#[test]
fn test_legend_swatches() {
    let fixture = fixture();
    let class = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND)).legend();
    let descriptions: Vec<&str> = class.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(descriptions, vec!["5", "Hoog"]);

    let gradient = adapter(&fixture, fixture.args("kunstwerken", GRADIENT_LEGEND)).legend();
    assert_eq!(gradient.len(), 5 + 2);
}

#[test]
fn test_symbol_style_for_point_legend() {
    let fixture = fixture();
    let point = adapter(&fixture, fixture.args("kunstwerken", POINT_LEGEND));
    let icon = point.symbol_style().unwrap();
    assert_eq!(icon.icon, "gemaal.png");
    assert_eq!(icon.mask.as_deref(), Some("gemaal_mask.png"));

    let class = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    assert!(class.symbol_style().is_none());
}

#[test]
fn test_extent_in_display_coordinates() {
    let fixture = fixture();
    let extent = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND)).extent().unwrap();
    let (west, _) = display(155000.0, 463000.0);
    let (east, _) = display(156000.0, 463000.0);
    assert!((extent.west - west).abs() < 1.0);
    assert!((extent.east - east).abs() < 1.0);
    assert!(extent.south <= extent.north);
}

#[test]
fn test_search_nearest_first() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    let (x, y) = display(155000.0, 463000.0);

    let results = adapter.search(x, y, Some(30.0));
    assert!(!results.is_empty());
    assert_eq!(results[0].name, "Gemaal Noord - Peil=5");
    assert_eq!(results[0].identifier, Some(Identifier::new("KW1")));
    assert!(results[0].distance < 1.0);
    assert!(results[0].coordinates.is_some());
    assert!(!ids(&results).contains("KW3"));
}

#[test]
fn test_search_sorted_and_capped() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    let (x, y) = display(155000.0, 463000.0);

    for radius in [None, Some(10.0), Some(100.0), Some(10_000.0)] {
        let results = adapter.search(x, y, radius);
        assert!(results.len() <= 3, "radius {:?}", radius);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
    let all = adapter.search(x, y, None);
    assert_eq!(ids(&all), ["KW1", "KW2", "KW5"].iter().map(|s| s.to_string()).collect());
}

#[test]
fn test_search_monotonic_in_radius() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    let (x, y) = display(155040.0, 463000.0);

    for radius in [5.0, 20.0, 40.0, 80.0, 160.0, 400.0, 2000.0] {
        let narrow = ids(&adapter.search(x, y, Some(radius)));
        let wide = ids(&adapter.search(x, y, Some(radius * 2.0)));
        assert!(narrow.is_subset(&wide), "radius {}: {:?} not in {:?}", radius, narrow, wide);
    }
}

#[test]
fn test_search_without_name_field_is_empty() {
    let fixture = fixture();
    let mut args = fixture.args("kunstwerken", CLASS_LEGEND);
    args.search_property_name = None;
    let adapter = adapter(&fixture, args);
    let (x, y) = display(155000.0, 463000.0);
    assert!(adapter.search(x, y, None).is_empty());
}

#[test]
fn test_search_stops_on_missing_display_field() {
    let fixture = fixture();
    let adapter = adapter(&fixture, {
        let mut args = fixture.args("kunstwerken", CLASS_LEGEND);
        args.display_fields.reverse();
        args
    });
    let (x, y) = display(155000.0, 463000.0);
    assert!(adapter.search(x, y, Some(1000.0)).is_empty());
}

#[test]
fn test_location_single_and_list() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));

    match adapter.location(&[Identifier::new("KW1")], false).unwrap() {
        Resolved::One(record) => {
            assert_eq!(record.name, serde_json::json!("Gemaal Noord"));
            assert_eq!(record.value, serde_json::json!(5.0));
            assert_eq!(record.value_name.as_deref(), Some("Status"));
            assert_eq!(record.values[0].value, serde_json::json!(5.0));
            assert_eq!(record.values[1].value, serde_json::json!(NOT_PRESENT));
            assert_eq!(record.identifier, Identifier::new("KW1"));
        }
        other => panic!("Expected one record, got {:?}", other),
    }

    assert!(matches!(
        adapter.location(&[Identifier::new("KW1")], true).unwrap(),
        Resolved::Many(ref records) if records.len() == 1
    ));

    let many = adapter
        .location(&[Identifier::new("KW1"), Identifier::new("KW2"), Identifier::new("nope")], false)
        .unwrap();
    assert_eq!(many.len(), 2);
}

#[test]
fn test_location_keeps_records_before_unreadable_feature() {
    let fixture = fixture();
    let shp = shp_path(fixture.root());
    let len = std::fs::metadata(&shp).unwrap().len();
    std::fs::OpenOptions::new().write(true).open(&shp).unwrap().set_len(len - 10).unwrap();

    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    match adapter.location(&[Identifier::new("KW1")], false).unwrap() {
        Resolved::One(record) => assert_eq!(record.identifier, Identifier::new("KW1")),
        other => panic!("Expected KW1, got {:?}", other),
    }

    let (x, y) = display(155000.0, 463000.0);
    assert_eq!(adapter.search(x, y, None).len(), 3);
}

#[test]
fn test_popup_with_time_series() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", POINT_LEGEND));
    let popup = adapter.popup(&[Identifier::new("KW1")], true).unwrap();

    assert_eq!(popup.display_group.len(), 1);
    assert!(popup.add_snippet);
    assert_eq!(popup.symbol.unwrap().icon, "gemaal.png");
    assert_eq!(
        popup.image_url.as_deref(),
        Some("/map/adapter/shape/image/?identifier=%7B%22id%22%3A%22KW1%22%7D")
    );
    assert_eq!(popup.timeseries_start, Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()));
}

#[test]
fn test_popup_without_time_series_and_capped() {
    let mut fixture = fixture();
    fixture.config.max_popup_results = 1;
    let adapter = adapter(&fixture, fixture.args("peilvakken", CLASS_LEGEND));
    let popup = adapter.popup(&[Identifier::new("KW1"), Identifier::new("KW2")], false).unwrap();

    assert_eq!(popup.display_group.len(), 1);
    assert!(popup.image_url.is_none());
    assert!(popup.timeseries_start.is_none());
    assert!(popup.symbol.is_none());
}

#[test]
fn test_time_series_graph() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("kunstwerken", CLASS_LEGEND));
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
    let identifiers = [Identifier::new("KW1"), Identifier::new("KW2")];

    let graph = adapter.graph(&identifiers, start, end, 380, 250, start);
    assert_eq!(graph.title(), Some("Q (1 locations)"));
    assert_eq!(graph.series_count(), 1);

    let bytes = adapter.image(&identifiers, start, end, 380, 250).unwrap();
    assert_eq!(title(&bytes).as_deref(), Some("Q (1 locations)"));
    assert_eq!(
        adapter.timeseries("KW1", Some(start), Some(end)).unwrap().len(),
        3
    );
}

#[test]
fn test_no_time_series_link_gives_no_data_image() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("peilvakken", CLASS_LEGEND));
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

    let bytes = adapter.image(&[Identifier::new("KW1")], start, end, 380, 250).unwrap();
    let image = image::load_from_memory(&bytes).unwrap();
    assert_eq!((image.width(), image.height()), (380, 250));
    assert_eq!(title(&bytes).as_deref(), Some("No data."));
}

#[test]
fn test_missing_dataset_degrades() {
    let fixture = fixture();
    let adapter = adapter(&fixture, fixture.args("verdwenen", CLASS_LEGEND));
    let (x, y) = display(155000.0, 463000.0);

    assert!(adapter.extent().is_none());
    assert!(adapter.search(x, y, Some(100.0)).is_empty());
    assert!(adapter.location(&[Identifier::new("KW1")], false).unwrap().is_empty());
    assert_eq!(adapter.layer().0.len(), 1);
}

#[test]
fn test_raw_path_inside_data_root() {
    let fixture = fixture();
    let args = LayerArguments {
        layer_name: "Raw".to_string(),
        layer_filename: Some("kunstwerken.shp".to_string()),
        search_property_name: Some("KWKNAAM".to_string()),
        search_property_id: Some("KWKIDENT".to_string()),
        ..Default::default()
    };
    let adapter = adapter(&fixture, args);
    assert_eq!(adapter.native_crs(), "EPSG:28992");
    assert!(adapter.shape().is_none());

    let (x, y) = display(155000.0, 463000.0);
    let results = adapter.search(x, y, None);
    assert_eq!(results[0].name, "Gemaal Noord");
}

#[test]
fn test_construction_errors() {
    let fixture = fixture();
    let build = |args: LayerArguments| {
        ShapeLayerAdapter::new(args, &fixture.catalog, &fixture.provider, fixture.config.clone())
            .err()
    };

    let mut unknown_legend = fixture.args("kunstwerken", CLASS_LEGEND);
    unknown_legend.legend_id = Some(99);
    assert!(matches!(build(unknown_legend), Some(ShapeLayerError::LegendNotFound { .. })));

    let mut untyped = fixture.args("kunstwerken", CLASS_LEGEND);
    untyped.legend_type = None;
    assert!(matches!(build(untyped), Some(ShapeLayerError::ConfigMissing { .. })));

    let mut wrong_kind = fixture.args("kunstwerken", CLASS_LEGEND);
    wrong_kind.legend_type = Some(LegendKind::Gradient);
    assert!(matches!(build(wrong_kind), Some(ShapeLayerError::LegendNotFound { .. })));

    let escape = LayerArguments {
        layer_name: "Raw".to_string(),
        layer_filename: Some("../elders.shp".to_string()),
        ..Default::default()
    };
    assert!(matches!(build(escape), Some(ShapeLayerError::PathRejected { .. })));

    let unknown_shape = LayerArguments {
        layer_name: "Onbekend".to_string(),
        shape_slug: Some("onbekend".to_string()),
        ..Default::default()
    };
    assert!(matches!(build(unknown_shape), Some(ShapeLayerError::ShapeNotFound { .. })));
}
