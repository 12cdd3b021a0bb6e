use crate::chart::{ChartSpec, ChartType};
use crate::prepare::PreparedSeries;
use crate::synthesize::surface_shading;
use crate::{RenderOptions, MAX_DIMENSION};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::prelude::*;
use std::ops::Range;

/// How a category series is marked on the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMark {
    Bar,
    Line,
    Area,
}

impl CategoryMark {
    fn for_chart(chart_type: ChartType) -> Self {
        match chart_type {
            ChartType::Line | ChartType::Terrain3d => CategoryMark::Line,
            ChartType::Area => CategoryMark::Area,
            _ => CategoryMark::Bar,
        }
    }
}

/// Style of a single marker in a point layer.
#[derive(Debug, Clone, Copy)]
pub struct PointStyle {
    pub radius: f64,
    pub color: HSLColor,
}

const SERIES_COLOR: HSLColor = HSLColor(0.62, 0.82, 0.53);

/// Off-screen RGB canvas for preview images.
pub struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    title: String,
}

impl Canvas {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("Canvas size must be non-zero (got {}x{})", width, height);
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .filter(|_| width <= MAX_DIMENSION && height <= MAX_DIMENSION)
            .ok_or_else(|| anyhow::anyhow!("Canvas size {}x{} is too large", width, height))?;
        Ok(Canvas {
            buffer: vec![0u8; len],
            width,
            height,
            title: title.into(),
        })
    }

    /// Category axis with one slot per label.
    pub fn draw_categories(&mut self, labels: &[String], values: &[f64], mark: CategoryMark) -> Result<()> {
        if labels.len() != values.len() {
            anyhow::bail!(
                "Labels and values must have the same length (labels: {}, values: {})",
                labels.len(),
                values.len()
            );
        }
        if labels.is_empty() {
            anyhow::bail!("Cannot draw a category chart with no data");
        }

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let n = labels.len();
        let x_range = -0.5..(n as f64 - 0.5);
        let y_range = padded_range(values.iter().copied().chain(std::iter::once(0.0)));

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&self.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        chart
            .configure_mesh()
            .x_labels(n.min(20))
            .x_label_formatter(&|x| {
                let idx = x.round();
                if (x - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .draw()
            .context("Failed to draw mesh")?;

        let points: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect();
        match mark {
            CategoryMark::Bar => {
                let bar_width = 0.8;
                chart
                    .draw_series(points.iter().map(|&(x, y)| {
                        Rectangle::new(
                            [(x - bar_width / 2.0, 0.0), (x + bar_width / 2.0, y)],
                            SERIES_COLOR.mix(0.7).filled(),
                        )
                    }))
                    .context("Failed to draw bars")?;
            }
            CategoryMark::Line => {
                chart
                    .draw_series(LineSeries::new(points, SERIES_COLOR.stroke_width(2)))
                    .context("Failed to draw line series")?;
            }
            CategoryMark::Area => {
                chart
                    .draw_series(
                        AreaSeries::new(points, 0.0, SERIES_COLOR.mix(0.3)).border_style(SERIES_COLOR),
                    )
                    .context("Failed to draw area series")?;
            }
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Free-standing markers on a continuous x/y plane.
    pub fn draw_points(
        &mut self,
        points: &[(f64, f64)],
        styles: &[PointStyle],
        x_range: Range<f64>,
        y_range: Range<f64>,
    ) -> Result<()> {
        if points.len() != styles.len() {
            anyhow::bail!(
                "Points and styles must have the same length (points: {}, styles: {})",
                points.len(),
                styles.len()
            );
        }
        if points.is_empty() {
            anyhow::bail!("Cannot draw a point chart with no data");
        }

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&self.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        chart.configure_mesh().draw().context("Failed to draw mesh")?;

        chart
            .draw_series(points.iter().zip(styles).map(|(&(x, y), style)| {
                Circle::new((x, y), style.radius.round() as i32, style.color.mix(0.7).filled())
            }))
            .context("Failed to draw point series")?;

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Encode the canvas as PNG.
    pub fn render(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&self.buffer, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }
        Ok(png_bytes)
    }
}

/// Draw a PNG preview of a prepared series.
pub fn render_preview(spec: &ChartSpec, series: &PreparedSeries, options: &RenderOptions) -> Result<Vec<u8>> {
    if series.is_empty() {
        anyhow::bail!("Cannot render '{}': no data points", spec.title);
    }

    let mut canvas = Canvas::new(options.width, options.height, spec.title.clone())?;
    match series {
        PreparedSeries::Categorical { labels, values } => {
            canvas.draw_categories(labels, values, CategoryMark::Bar)?;
        }
        PreparedSeries::Labeled { labels, values } => {
            canvas.draw_categories(labels, values, CategoryMark::for_chart(spec.chart_type))?;
        }
        PreparedSeries::Pairs { points } => {
            let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
            let styles = vec![PointStyle { radius: 5.0, color: SERIES_COLOR }; xy.len()];
            canvas.draw_points(
                &xy,
                &styles,
                padded_range(xy.iter().map(|p| p.0)),
                padded_range(xy.iter().map(|p| p.1)),
            )?;
        }
        PreparedSeries::Triples { points } => {
            let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
            let styles: Vec<PointStyle> = surface_shading(points)
                .into_iter()
                .map(|hsl| PointStyle {
                    radius: 8.0,
                    color: HSLColor(hsl.hue / 360.0, hsl.saturation / 100.0, hsl.lightness / 100.0),
                })
                .collect();
            canvas.draw_points(
                &xy,
                &styles,
                padded_range(xy.iter().map(|p| p.0)),
                padded_range(xy.iter().map(|p| p.1)),
            )?;
        }
        PreparedSeries::Geographic { points } => {
            let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.longitude, p.latitude)).collect();
            let styles: Vec<PointStyle> = points
                .iter()
                .map(|p| PointStyle {
                    radius: p.size,
                    color: HSLColor(p.hue / 360.0, 0.7, 0.5),
                })
                .collect();
            canvas.draw_points(&xy, &styles, -180.0..180.0, -90.0..90.0)?;
        }
    }

    tracing::debug!(
        width = options.width,
        height = options.height,
        shape = series.shape_name(),
        "rendered preview"
    );
    canvas.render()
}

/// Data range with 5% padding; a degenerate range is widened by one unit each way.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}
