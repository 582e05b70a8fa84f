//! Shared fixture: a small point shapefile in RD New with a catalog around it

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapelayer_core::config::AdapterConfig;
use shapelayer_core::memory::{FileTimeSeriesProvider, MemoryShapeCatalog};
use shapelayer_core::models::{
    ClassLegend, FieldType, GradientLegend, LayerArguments, LegendClassEntry, LegendDefinition,
    PointLegend, Shape, ShapeField, ShapeFiles, ShapeId, ShapeTemplate, TimeSeriesLink,
};
use tempfile::TempDir;

pub const RD_PRJ: &str = r#"PROJCS["Amersfoort / RD New",GEOGCS["Amersfoort",DATUM["Amersfoort",SPHEROID["Bessel 1841",6377397.155,299.1528128]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Oblique_Stereographic"],UNIT["metre",1],AUTHORITY["EPSG","28992"]]"#;

pub const CLASS_LEGEND: u64 = 1;
pub const GRADIENT_LEGEND: u64 = 2;
pub const POINT_LEGEND: u64 = 3;

/// (id, name, x, y, PEIL) in RD New
pub const FEATURES: &[(&str, &str, f64, f64, f64)] = &[
    ("KW1", "Gemaal Noord", 155000.0, 463000.0, 5.0),
    ("KW2", "Stuw Oost", 155010.0, 463000.0, 6.0),
    ("KW5", "Sluis Zuid", 155020.0, 463000.0, 12.0),
    ("KW3", "Brug West", 155100.0, 463000.0, 0.0),
    ("KW4", "Gemaal Ver", 156000.0, 463000.0, 25.0),
];

pub const SERIES: &str = r#"{
    "series": {
        "KW1": {
            "Q": [
                ["2024-01-02T00:00:00Z", 4.5],
                ["2024-01-03T00:00:00Z", 5.5],
                ["2024-01-04T00:00:00Z", 3.0]
            ]
        }
    }
}"#;

pub struct Fixture {
    pub dir: TempDir,
    pub catalog: MemoryShapeCatalog,
    pub config: AdapterConfig,
    pub provider: FileTimeSeriesProvider,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn shape(&self, slug: &str) -> Shape {
        use shapelayer_core::ports::ShapeCatalog;
        self.catalog.shape_by_slug(slug).unwrap().unwrap()
    }

    /// Layer arguments for a template legend of `slug`.
    pub fn args(&self, slug: &str, legend_id: u64) -> LayerArguments {
        let shape = self.shape(slug);
        let legend = shape.template.legends.iter().find(|l| l.id() == legend_id).unwrap();
        LayerArguments::for_legend(&shape, legend)
    }
}

pub fn template() -> ShapeTemplate {
    ShapeTemplate::new(1, "kunstwerken")
        .with_id_field("KWKIDENT")
        .with_name_field("KWKNAAM")
        .with_field(ShapeField {
            name: "Peil".to_string(),
            field: "PEIL".to_string(),
            field_type: FieldType::Normal,
            index: 1,
        })
        .with_field(ShapeField {
            name: "Foto".to_string(),
            field: "FOTO".to_string(),
            field_type: FieldType::Image,
            index: 2,
        })
        .with_legend(LegendDefinition::Class(
            ClassLegend::new(CLASS_LEGEND, "Status", "PEIL")
                .with_class(LegendClassEntry::exact(1, "5").with_color("ff0000"))
                .with_class(
                    LegendClassEntry::range(2, Some("10"), Some("20"))
                        .with_label("Hoog")
                        .with_fill("00ff00"),
                ),
        ))
        .with_legend(LegendDefinition::Gradient(
            GradientLegend::new(GRADIENT_LEGEND, "Peil", "PEIL").with_range(0.0, 10.0, 5),
        ))
        .with_legend(LegendDefinition::Point(
            PointLegend::new(GradientLegend::new(POINT_LEGEND, "Peil icoon", "PEIL"))
                .with_icon("gemaal.png", Some("gemaal_mask.png".to_string())),
        ))
}

/// Write a point shapefile with KWKIDENT, KWKNAAM and PEIL columns.
pub fn write_points(shp: &Path, features: &[(&str, &str, f64, f64, f64)]) {
    let builder = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("KWKIDENT").unwrap(), 20)
        .add_character_field(FieldName::try_from("KWKNAAM").unwrap(), 50)
        .add_numeric_field(FieldName::try_from("PEIL").unwrap(), 10, 2);
    let mut writer = shapefile::Writer::from_path(shp, builder).unwrap();
    for (id, name, x, y, peil) in features {
        let mut record = Record::default();
        record.insert("KWKIDENT".to_string(), FieldValue::Character(Some(id.to_string())));
        record.insert("KWKNAAM".to_string(), FieldValue::Character(Some(name.to_string())));
        record.insert("PEIL".to_string(), FieldValue::Numeric(Some(*peil)));
        writer.write_shape_and_record(&shapefile::Point::new(*x, *y), &record).unwrap();
    }
}

/// Shapes: `kunstwerken` (with time series), `peilvakken` (without) and
/// `verdwenen` (files missing, projection present).
pub fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();

    let shp = root.join("kunstwerken.shp");
    write_points(&shp, FEATURES);
    fs::write(root.join("kunstwerken.prj"), RD_PRJ).unwrap();
    fs::write(root.join("series.json"), SERIES).unwrap();
    fs::write(root.join("verdwenen.prj"), RD_PRJ).unwrap();

    let mut catalog = MemoryShapeCatalog::new();
    let kunstwerken =
        Shape::register(ShapeId(1), "Kunstwerken", "kunstwerken", ShapeFiles::from_shp(&shp), template())
            .unwrap()
            .with_description("Gemalen, stuwen en sluizen")
            .with_timeseries(TimeSeriesLink {
                path: root.join("series.json"),
                parameter: Some("Q".to_string()),
            });
    catalog.insert(kunstwerken).unwrap();

    let peilvakken =
        Shape::register(ShapeId(2), "Peilvakken", "peilvakken", ShapeFiles::from_shp(&shp), template())
            .unwrap();
    catalog.insert(peilvakken).unwrap();

    let verdwenen = Shape::register(
        ShapeId(3),
        "Verdwenen",
        "verdwenen",
        ShapeFiles::from_shp(root.join("verdwenen.shp")),
        template(),
    )
    .unwrap();
    catalog.insert(verdwenen).unwrap();

    let mut config = AdapterConfig::default();
    config.data_root = root.clone();

    Fixture { provider: FileTimeSeriesProvider::new(root.clone()), dir, catalog, config }
}

pub fn shp_path(root: &Path) -> PathBuf {
    root.join("kunstwerken.shp")
}
