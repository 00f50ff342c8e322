//! Static Chart Renderer
//! Generates the four PNG charts from the sales aggregates.
//!
//! Charts:
//! 1. Bar chart of Sales by Category
//! 2. Bar chart of Sales by Region, labels rotated 45 degrees
//! 3. Line chart of monthly Sales with markers
//! 4. Pie chart of Sales by Segment with percentages
//!
//! Each chart is drawn by plotters into an RGB buffer, finished in the
//! `image` buffer (rotated labels) and encoded to PNG with a 300 DPI pHYs chunk.

use crate::charts::labels::{rotated_extent, stamp_rotated_label};
use crate::config::{ChartStyle, Rgb as RgbTriple, CHART_DPI};
use crate::error::{AnalysisError, Result};
use crate::format::with_thousands;
use crate::stats::{GroupTotal, MonthTotal, SalesAggregates};
use image::RgbImage;
use log::{debug, info};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const LABEL_ROTATION_DEG: f64 = 45.0;
const LABEL_COLOR: image::Rgb<u8> = image::Rgb([0, 0, 0]);

/// pHYs resolution; 300 DPI is 11811 pixels per metre.
const PIXELS_PER_METER: u32 = CHART_DPI * 10_000 / 254;

/// The charts produced by one run, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Category,
    Region,
    Trend,
    Segment,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Category,
        ChartKind::Region,
        ChartKind::Trend,
        ChartKind::Segment,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Category => "sales_by_category.png",
            ChartKind::Region => "sales_by_region.png",
            ChartKind::Trend => "sales_trend.png",
            ChartKind::Segment => "sales_by_segment.png",
        }
    }

    /// Figure size in inches.
    pub fn figure_inches(self) -> (f64, f64) {
        match self {
            ChartKind::Trend => (14.0, 6.0),
            _ => (10.0, 6.0),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Category => "Total Sales by Category",
            ChartKind::Region => "Total Sales by Region",
            ChartKind::Trend => "Monthly Sales Trend",
            ChartKind::Segment => "Sales Distribution by Customer Segment",
        }
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Render(e.to_string())
}

/// Palette entry `i`, cycling; black if the palette is empty.
fn palette_color(palette: &[RgbTriple], i: usize) -> RGBColor {
    match palette.get(i % palette.len().max(1)) {
        Some([r, g, b]) => RGBColor(*r, *g, *b),
        None => BLACK,
    }
}

/// Upper y bound leaving headroom above the tallest bar.
fn axis_top(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

/// y range padded by 5% of the span, never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad, hi + pad)
}

/// Renders every chart with one explicit style.
pub struct StaticChartRenderer {
    style: ChartStyle,
}

impl StaticChartRenderer {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }

    /// Write all four charts into `out_dir`, overwriting existing files.
    pub fn render_all(&self, aggregates: &SalesAggregates, out_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir).map_err(|e| AnalysisError::file_access(out_dir, e))?;

        let mut written = Vec::with_capacity(ChartKind::ALL.len());
        for kind in ChartKind::ALL {
            let size = self.figure_px(kind);
            let image = match kind {
                ChartKind::Category => self.bar_chart(
                    kind,
                    "Category",
                    &aggregates.by_category,
                    &self.style.category_colors,
                    false,
                )?,
                ChartKind::Region => self.bar_chart(
                    kind,
                    "Region",
                    &aggregates.by_region,
                    &self.style.region_colors,
                    true,
                )?,
                ChartKind::Trend => self.trend_chart(&aggregates.monthly)?,
                ChartKind::Segment => self.pie_chart(&aggregates.by_segment)?,
            };
            debug!("{} drawn at {}x{}", kind.file_name(), size.0, size.1);

            let path = out_dir.join(kind.file_name());
            Self::save_png(&image, &path)?;
            info!("Created: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Encode an image as PNG at `path`, stamped with the chart resolution.
    pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
        let encode_err = |e: png::EncodingError| match e {
            png::EncodingError::IoError(source) => AnalysisError::file_access(path, source),
            other => render_err(other),
        };

        let file = File::create(path).map_err(|e| AnalysisError::file_access(path, e))?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: PIXELS_PER_METER,
            yppu: PIXELS_PER_METER,
            unit: png::Unit::Meter,
        }));

        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(image.as_raw()).map_err(encode_err)?;
        writer.finish().map_err(encode_err)
    }

    pub fn figure_px(&self, kind: ChartKind) -> (u32, u32) {
        let (w, h) = kind.figure_inches();
        self.style.figure_px(w, h)
    }

    fn font(&self, points: f64, weight: FontStyle) -> FontDesc<'_> {
        FontDesc::new(
            FontFamily::from(self.style.font_family.as_str()),
            self.style.px(points) as f64,
            weight,
        )
    }

    fn text_style(&self, points: f64) -> TextStyle<'_> {
        TextStyle::from(self.font(points, FontStyle::Normal))
    }

    fn title_style(&self) -> TextStyle<'_> {
        TextStyle::from(self.font(self.style.title_pt, FontStyle::Bold))
    }

    /// Draw onto a white canvas of `size` pixels and hand back the pixels.
    fn draw<T, F>(size: (u32, u32), draw: F) -> Result<(RgbImage, T)>
    where
        F: FnOnce(&Canvas<'_>) -> Result<T>,
    {
        let (w, h) = size;
        let mut buffer = vec![255u8; w as usize * h as usize * 3];
        let out = {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            let out = draw(&root)?;
            root.present().map_err(render_err)?;
            out
        };
        let image = RgbImage::from_raw(w, h, buffer)
            .ok_or_else(|| AnalysisError::Render("pixel buffer size mismatch".to_string()))?;
        Ok((image, out))
    }

    /// Bar chart with one bar per group, x labels centred under the bars or
    /// rotated 45 degrees.
    fn bar_chart(
        &self,
        kind: ChartKind,
        x_desc: &str,
        totals: &[GroupTotal],
        palette: &[RgbTriple],
        rotate_labels: bool,
    ) -> Result<RgbImage> {
        let style = &self.style;
        let tick_font = self.font(style.tick_label_pt, FontStyle::Normal);
        let tick_px = style.px(style.tick_label_pt);
        let axis_px = style.px(style.axis_label_pt);

        let label_h = if rotate_labels {
            totals
                .iter()
                .filter_map(|g| tick_font.box_size(&g.label).ok())
                .map(|(w, h)| rotated_extent(w, h, LABEL_ROTATION_DEG).1)
                .max()
                .unwrap_or(tick_px)
        } else {
            tick_px * 2
        };

        let (mut image, anchors) = Self::draw(self.figure_px(kind), |root| {
            let n = totals.len().max(1);
            let y_formatter = |v: &f64| with_thousands(*v, 0);
            let no_label = |_: &f64| String::new();

            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), self.title_style())
                .margin(style.px(12.0))
                .x_label_area_size(label_h + tick_px + axis_px * 2)
                .y_label_area_size(tick_px * 5 + axis_px * 2)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..axis_top(totals.iter().map(|g| g.sales)))
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .light_line_style(WHITE)
                .bold_line_style(BLACK.mix(style.grid_alpha))
                .x_labels(n + 1)
                .x_label_formatter(&no_label)
                .y_label_formatter(&y_formatter)
                .y_label_style(self.text_style(style.tick_label_pt))
                .x_desc(x_desc)
                .y_desc("Sales ($)")
                .axis_desc_style(self.text_style(style.axis_label_pt))
                .draw()
                .map_err(render_err)?;

            chart
                .draw_series(totals.iter().enumerate().map(|(i, group)| {
                    let x = i as f64;
                    Rectangle::new(
                        [(x - 0.4, 0.0), (x + 0.4, group.sales)],
                        palette_color(palette, i).filled(),
                    )
                }))
                .map_err(render_err)?;

            let anchors: Vec<(i32, i32)> = (0..totals.len())
                .map(|i| {
                    let (x, y) = chart.backend_coord(&(i as f64, 0.0));
                    (x, y + tick_px as i32 / 2)
                })
                .collect();

            if !rotate_labels {
                let label_style = TextStyle::from(tick_font.clone())
                    .pos(Pos::new(HPos::Center, VPos::Top));
                for (group, anchor) in totals.iter().zip(&anchors) {
                    root.draw_text(&group.label, &label_style, *anchor)
                        .map_err(render_err)?;
                }
            }
            Ok(anchors)
        })?;

        if rotate_labels {
            for (group, anchor) in totals.iter().zip(anchors) {
                stamp_rotated_label(
                    &mut image,
                    &group.label,
                    &tick_font,
                    LABEL_COLOR,
                    anchor,
                    LABEL_ROTATION_DEG,
                )?;
            }
        }
        Ok(image)
    }

    /// Line chart of monthly totals with a marker on every month.
    fn trend_chart(&self, monthly: &[MonthTotal]) -> Result<RgbImage> {
        let style = &self.style;
        let tick_px = style.px(style.tick_label_pt);
        let axis_px = style.px(style.axis_label_pt);
        let labels: Vec<String> = monthly.iter().map(MonthTotal::label).collect();
        let points: Vec<(f64, f64)> = monthly
            .iter()
            .enumerate()
            .map(|(i, m)| (i as f64, m.sales))
            .collect();

        let (image, ()) = Self::draw(self.figure_px(ChartKind::Trend), |root| {
            let n = monthly.len().max(1);
            let (y_lo, y_hi) = padded_range(monthly.iter().map(|m| m.sales));
            let x_formatter = |x: &f64| {
                let i = x.round();
                if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < labels.len() {
                    labels[i as usize].clone()
                } else {
                    String::new()
                }
            };
            let y_formatter = |v: &f64| with_thousands(*v, 0);

            let mut chart = ChartBuilder::on(root)
                .caption(ChartKind::Trend.title(), self.title_style())
                .margin(style.px(12.0))
                .x_label_area_size(tick_px * 2 + axis_px * 2)
                .y_label_area_size(tick_px * 5 + axis_px * 2)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_hi)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .light_line_style(WHITE)
                .bold_line_style(BLACK.mix(style.grid_alpha))
                .x_labels(n.min(12))
                .x_label_formatter(&x_formatter)
                .y_label_formatter(&y_formatter)
                .x_label_style(self.text_style(style.tick_label_pt))
                .y_label_style(self.text_style(style.tick_label_pt))
                .x_desc("Month")
                .y_desc("Sales ($)")
                .axis_desc_style(self.text_style(style.axis_label_pt))
                .draw()
                .map_err(render_err)?;

            let [r, g, b] = style.trend_color;
            let color = RGBColor(r, g, b);
            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    color.stroke_width(style.px(style.line_width_pt)),
                ))
                .map_err(render_err)?;

            let radius = (style.px(style.marker_size_pt) / 2).max(1) as i32;
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, radius, color.filled())))
                .map_err(render_err)?;
            Ok(())
        })?;
        Ok(image)
    }

    /// Pie chart of segment totals with percentage labels, first slice at
    /// twelve o'clock.
    fn pie_chart(&self, totals: &[GroupTotal]) -> Result<RgbImage> {
        let style = &self.style;
        let sizes: Vec<f64> = totals.iter().map(|g| g.sales.max(0.0)).collect();
        let colors: Vec<RGBColor> = (0..totals.len())
            .map(|i| palette_color(&style.segment_colors, i))
            .collect();
        let labels: Vec<&str> = totals.iter().map(|g| g.label.as_str()).collect();

        let (image, ()) = Self::draw(self.figure_px(ChartKind::Segment), |root| {
            let area = root
                .titled(ChartKind::Segment.title(), self.title_style())
                .map_err(render_err)?;
            if sizes.iter().sum::<f64>() <= 0.0 {
                return Ok(());
            }

            let (w, h) = area.dim_in_pixel();
            let center = ((w / 2) as i32, (h / 2) as i32);
            let radius = w.min(h) as f64 * 0.4;

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.start_angle(-90.0);
            pie.label_style(self.text_style(style.axis_label_pt));
            pie.percentages(self.text_style(style.tick_label_pt));
            area.draw(&pie).map_err(render_err)?;
            Ok(())
        })?;
        Ok(image)
    }
}
