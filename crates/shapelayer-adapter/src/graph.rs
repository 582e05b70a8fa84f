//! Time-series graphs rendered to PNG
//!
//! The graph title and y-axis label are stored as PNG `Title` and `YLabel`
//! text chunks next to the drawn canvas.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use shapelayer_core::models::{Color, Identifier};
use shapelayer_core::ports::TimeSeriesPoint;
use shapelayer_core::{Result, ShapeLayerError};

pub const NO_DATA: &str = "No data.";

const GRID_LINES: u32 = 5;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FRAME: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRID: Rgba<u8> = Rgba([221, 221, 221, 255]);
const TODAY: Rgba<u8> = Rgba([255, 102, 0, 255]);

/// Line colors, assigned to identifiers in request order.
const PALETTE: [Color; 7] = [
    Color::rgb(0x00, 0x00, 0xff),
    Color::rgb(0xff, 0x00, 0x00),
    Color::rgb(0x00, 0x80, 0x00),
    Color::rgb(0x00, 0xbf, 0xbf),
    Color::rgb(0xbf, 0x00, 0xbf),
    Color::rgb(0xbf, 0xbf, 0x00),
    Color::rgb(0x00, 0x00, 0x00),
];

/// Line color per identifier key, cycling through a fixed palette.
pub fn line_colors(identifiers: &[Identifier]) -> BTreeMap<String, Color> {
    let mut colors = BTreeMap::new();
    for identifier in identifiers {
        let next = PALETTE[colors.len() % PALETTE.len()];
        colors.entry(identifier.key()).or_insert(next);
    }
    colors
}

#[derive(Debug, Clone)]
pub struct Graph {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    width: u32,
    height: u32,
    today: DateTime<Utc>,
    title: Option<String>,
    ylabel: Option<String>,
    series: Vec<(Vec<TimeSeriesPoint>, Color)>,
}

impl Graph {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        width: u32,
        height: u32,
        today: DateTime<Utc>,
    ) -> Self {
        Self {
            start,
            end,
            width: width.max(1),
            height: height.max(1),
            today,
            title: None,
            ylabel: None,
            series: Vec::new(),
        }
    }

    pub fn suptitle(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.ylabel = Some(label.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn plot(&mut self, points: Vec<TimeSeriesPoint>, color: Color) {
        self.series.push((points, color));
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Draw frame, grid, series and the today marker.
    pub fn render(&self) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        let area = PlotArea::new(self.width, self.height);

        for i in 1..GRID_LINES {
            let fx = area.left + area.width * i as f32 / GRID_LINES as f32;
            let fy = area.top + area.height * i as f32 / GRID_LINES as f32;
            draw_line_segment_mut(&mut canvas, (fx, area.top), (fx, area.bottom()), GRID);
            draw_line_segment_mut(&mut canvas, (area.left, fy), (area.right(), fy), GRID);
        }

        let (low, high) = self.value_range();
        for (points, color) in &self.series {
            let pixel = Rgba([color.r, color.g, color.b, color.a]);
            let projected: Vec<(f32, f32)> = points
                .iter()
                .map(|(t, v)| (area.x(self.time_fraction(*t)), area.y((v - low) / (high - low))))
                .collect();
            match projected.as_slice() {
                [] => {}
                [(x, y)] => draw_filled_rect_mut(
                    &mut canvas,
                    Rect::at(*x as i32 - 1, *y as i32 - 1).of_size(3, 3),
                    pixel,
                ),
                many => {
                    for pair in many.windows(2) {
                        draw_line_segment_mut(&mut canvas, pair[0], pair[1], pixel);
                    }
                }
            }
        }

        if self.start <= self.today && self.today <= self.end {
            let x = area.x(self.time_fraction(self.today));
            draw_line_segment_mut(&mut canvas, (x, area.top), (x, area.bottom()), TODAY);
        }

        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(area.left as i32, area.top as i32)
                .of_size((area.width as u32).max(1), (area.height as u32).max(1)),
            FRAME,
        );
        canvas
    }

    /// Encoded PNG with `Title` and `YLabel` text chunks.
    pub fn png(&self) -> Result<Vec<u8>> {
        let canvas = self.render();
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            if let Some(title) = &self.title {
                encoder.add_text_chunk("Title".to_string(), title.clone()).map_err(render_error)?;
            }
            if let Some(label) = &self.ylabel {
                encoder.add_text_chunk("YLabel".to_string(), label.clone()).map_err(render_error)?;
            }
            let mut writer = encoder.write_header().map_err(render_error)?;
            writer.write_image_data(canvas.as_raw()).map_err(render_error)?;
            writer.finish().map_err(render_error)?;
        }
        Ok(bytes)
    }

    fn time_fraction(&self, t: DateTime<Utc>) -> f64 {
        let span = (self.end - self.start).num_seconds();
        if span <= 0 {
            return 0.0;
        }
        (t - self.start).num_seconds() as f64 / span as f64
    }

    /// Value axis bounds over every series, padded when flat.
    fn value_range(&self) -> (f64, f64) {
        let values = self.series.iter().flat_map(|(points, _)| points.iter().map(|(_, v)| *v));
        let (low, high) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !low.is_finite() {
            return (0.0, 1.0);
        }
        if high - low < f64::EPSILON {
            return (low - 1.0, high + 1.0);
        }
        (low, high)
    }
}

fn render_error(e: png::EncodingError) -> ShapeLayerError {
    ShapeLayerError::Render(e.to_string())
}

/// Pixel rectangle inside the margins.
struct PlotArea {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl PlotArea {
    fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let left = (w * 0.12).floor();
        let right = (w * 0.04).floor();
        let top = (h * 0.12).floor();
        let bottom = (h * 0.12).floor();
        Self {
            left,
            top,
            width: (w - left - right).max(1.0),
            height: (h - top - bottom).max(1.0),
        }
    }

    fn right(&self) -> f32 {
        self.left + self.width
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }

    fn x(&self, fraction: f64) -> f32 {
        self.left + self.width * fraction.clamp(0.0, 1.0) as f32
    }

    fn y(&self, fraction: f64) -> f32 {
        self.bottom() - self.height * fraction.clamp(0.0, 1.0) as f32
    }
}
