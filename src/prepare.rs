//! Series preparation: rows plus a chart choice in, renderer-ready series out.

use crate::chart::{ChartSpec, ChartType};
use crate::coerce::{to_label, to_number, to_number_opt, UNKNOWN_LABEL};
use crate::data::Row;
use crate::synthesize::{scatter_unmatched, synthesize_geography, GeoPoint, SurfaceNoise};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Output of [`prepare`]; the variant is fixed by the chart family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum PreparedSeries {
    /// Unique labels in first-seen order with summed values (pie).
    Categorical { labels: Vec<String>, values: Vec<f64> },
    /// One (label, value) per row, duplicates kept (bar/line/area family).
    Labeled { labels: Vec<String>, values: Vec<f64> },
    /// One (x, y) per row (scatter/bubble).
    Pairs { points: Vec<Point2> },
    /// One (x, y, z) per row (surface).
    Triples { points: Vec<Point3> },
    /// One located point per row (map).
    Geographic { points: Vec<GeoPoint> },
}

impl PreparedSeries {
    pub fn len(&self) -> usize {
        match self {
            PreparedSeries::Categorical { labels, .. } | PreparedSeries::Labeled { labels, .. } => {
                labels.len()
            }
            PreparedSeries::Pairs { points } => points.len(),
            PreparedSeries::Triples { points } => points.len(),
            PreparedSeries::Geographic { points } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            PreparedSeries::Categorical { .. } => "categorical",
            PreparedSeries::Labeled { .. } => "labeled",
            PreparedSeries::Pairs { .. } => "pairs",
            PreparedSeries::Triples { .. } => "triples",
            PreparedSeries::Geographic { .. } => "geographic",
        }
    }
}

/// Shape the rows for the chart family named in `spec`.
///
/// Never fails: absent columns and unparsable cells degrade to `0`, `""` or
/// `"Unknown"` depending on the path. Calling it twice on the same input gives
/// equal output.
pub fn prepare(rows: &[Row], spec: &ChartSpec) -> PreparedSeries {
    let series = match spec.chart_type {
        ChartType::Pie => categorical(rows, &spec.x_field, &spec.y_field),
        ChartType::Scatter | ChartType::Bubble => pairs(rows, &spec.x_field, &spec.y_field),
        ChartType::Surface3d => {
            triples(rows, &spec.x_field, &spec.y_field, spec.z_field.as_deref())
        }
        ChartType::Map3d => {
            let mut points = synthesize_geography(rows, &spec.x_field, &spec.y_field);
            scatter_unmatched(&mut points);
            PreparedSeries::Geographic { points }
        }
        _ => labeled(rows, &spec.x_field, &spec.y_field),
    };

    tracing::debug!(
        chart_type = %spec.chart_type,
        rows = rows.len(),
        shape = series.shape_name(),
        len = series.len(),
        "prepared series"
    );
    series
}

fn categorical(rows: &[Row], x_field: &str, y_field: &str) -> PreparedSeries {
    let mut sums: IndexMap<String, f64> = IndexMap::new();
    for row in rows {
        let label = to_label(row.get(x_field), UNKNOWN_LABEL);
        *sums.entry(label).or_insert(0.0) += to_number(row.get(y_field));
    }
    let (labels, values) = sums.into_iter().unzip();
    PreparedSeries::Categorical { labels, values }
}

fn labeled(rows: &[Row], x_field: &str, y_field: &str) -> PreparedSeries {
    let (labels, values) = rows
        .iter()
        .map(|row| (to_label(row.get(x_field), ""), to_number(row.get(y_field))))
        .unzip();
    PreparedSeries::Labeled { labels, values }
}

fn pairs(rows: &[Row], x_field: &str, y_field: &str) -> PreparedSeries {
    let points = rows
        .iter()
        .map(|row| Point2 {
            x: to_number(row.get(x_field)),
            y: to_number(row.get(y_field)),
        })
        .collect();
    PreparedSeries::Pairs { points }
}

fn triples(rows: &[Row], x_field: &str, y_field: &str, z_field: Option<&str>) -> PreparedSeries {
    let mut noise = SurfaceNoise::new();
    let points = rows
        .iter()
        .enumerate()
        .map(|(index, row)| Point3 {
            // Non-numeric x keeps the row on the surface at its position.
            x: to_number_opt(row.get(x_field)).unwrap_or(index as f64),
            y: to_number(row.get(y_field)),
            z: match z_field {
                Some(field) => to_number(row.get(field)),
                None => noise.next_z(),
            },
        })
        .collect();
    PreparedSeries::Triples { points }
}
