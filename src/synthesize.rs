//! Synthetic spatial placement for map and surface charts.
//!
//! Ordinary business tables rarely carry coordinates or elevations, so the 3D
//! views derive them: place names go through a small built-in lookup table, and
//! a missing z becomes seeded noise. Everything is deterministic.

use crate::coerce::{to_label, to_number};
use crate::data::Row;
use crate::prepare::Point3;
use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

pub const MIN_POINT_SIZE: f64 = 5.0;
pub const MAX_POINT_SIZE: f64 = 40.0;

const SURFACE_SEED: u64 = 0x5EED_5A7F;
const JITTER_SEED: u64 = 0x6E0_C0DE;

/// Demonstration place names with approximate (latitude, longitude).
const KNOWN_LOCATIONS: &[(&str, f64, f64)] = &[
    ("North", 45.0, -100.0),
    ("South", 30.0, -90.0),
    ("East", 40.0, -75.0),
    ("West", 35.0, -120.0),
    ("New York", 40.7128, -74.0060),
    ("California", 36.7783, -119.4179),
    ("Texas", 31.9686, -99.9018),
    ("Florida", 27.7663, -82.6404),
    ("London", 51.5074, -0.1278),
    ("Paris", 48.8566, 2.3522),
    ("Tokyo", 35.6762, 139.6503),
    ("Sydney", -33.8688, 151.2093),
];

/// Exact, case-sensitive match against the built-in table.
pub fn lookup_coordinates(name: &str) -> Option<(f64, f64)> {
    KNOWN_LOCATIONS
        .iter()
        .find(|(known, _, _)| *known == name)
        .map(|&(_, lat, lng)| (lat, lng))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
    /// Degrees in [0, 360).
    pub hue: f64,
    pub size: f64,
    /// False when the label was not in the lookup table.
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// One point per row, in row order. Unknown places sit at (0, 0).
pub fn synthesize_geography(rows: &[Row], location_field: &str, value_field: &str) -> Vec<GeoPoint> {
    build_points(rows, location_field, value_field, None)
}

/// Like [`synthesize_geography`], additionally tagging each point with its time key.
pub fn synthesize_geography_over_time(
    rows: &[Row],
    location_field: &str,
    value_field: &str,
    time_field: &str,
) -> Vec<GeoPoint> {
    build_points(rows, location_field, value_field, Some(time_field))
}

fn build_points(
    rows: &[Row],
    location_field: &str,
    value_field: &str,
    time_field: Option<&str>,
) -> Vec<GeoPoint> {
    let mut points: Vec<GeoPoint> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let label = to_label(row.get(location_field), &format!("Point {}", index));
            let (latitude, longitude, matched) = match lookup_coordinates(&label) {
                Some((lat, lng)) => (lat, lng, true),
                None => (0.0, 0.0, false),
            };
            let value = to_number(row.get(value_field));
            let time = time_field
                .map(|field| row.get(field))
                .filter(|v| !v.is_missing())
                .map(|v| to_label(v, ""));
            GeoPoint {
                label,
                latitude,
                longitude,
                value,
                hue: value_hue(value),
                size: MIN_POINT_SIZE,
                matched,
                time,
            }
        })
        .collect();

    let max_value = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    for point in &mut points {
        point.size = point_size(point.value, max_value);
    }

    let unmatched = points.iter().filter(|p| !p.matched).count();
    if unmatched > 0 {
        tracing::debug!(unmatched, total = points.len(), "locations not in lookup table");
    }
    points
}

pub fn value_hue(value: f64) -> f64 {
    value.rem_euclid(360.0)
}

/// Square-root scale so that symbol area, not radius, tracks the value.
pub fn point_size(value: f64, max_value: f64) -> f64 {
    if max_value.is_nan() || max_value <= 0.0 {
        return MIN_POINT_SIZE;
    }
    let ratio = (value.max(0.0) / max_value).min(1.0);
    (MAX_POINT_SIZE * ratio.sqrt()).max(MIN_POINT_SIZE)
}

/// Give unmatched points a spread-out synthetic position instead of stacking them at the origin.
///
/// Longitude walks with the point index plus up to 100 degrees of jitter,
/// wrapped into [-180, 180); latitude is jittered within [-40, 40).
pub fn scatter_unmatched(points: &mut [GeoPoint]) {
    let mut rng = StdRng::seed_from_u64(JITTER_SEED);
    for (index, point) in points.iter_mut().enumerate() {
        let lng_jitter: f64 = rng.gen_range(0.0..100.0);
        let lat_jitter: f64 = rng.gen_range(-40.0..40.0);
        if point.matched {
            continue;
        }
        point.longitude = wrap_longitude(index as f64 * 10.0 + lng_jitter);
        point.latitude = lat_jitter;
    }
}

fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Sorted distinct time keys; rows without a time value are skipped.
pub fn time_frames(rows: &[Row], time_field: &str) -> Vec<String> {
    rows.iter()
        .map(|row| row.get(time_field))
        .filter(|v| !v.is_missing())
        .map(|v| to_label(v, ""))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Points belonging to one animation frame.
pub fn frame<'a>(points: &'a [GeoPoint], time_key: &'a str) -> impl Iterator<Item = &'a GeoPoint> + 'a {
    points
        .iter()
        .filter(move |p| p.time.as_deref() == Some(time_key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapProjection {
    #[default]
    Globe,
    Flat,
}

impl FromStr for MapProjection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "globe" => Ok(MapProjection::Globe),
            "flat" => Ok(MapProjection::Flat),
            other => Err(anyhow!("Unknown projection '{}' (expected globe or flat)", other)),
        }
    }
}

/// Screen position in percent of the map viewport, origin top-left.
pub fn project(point: &GeoPoint, projection: MapProjection) -> (f64, f64) {
    let k = match projection {
        MapProjection::Globe => 30.0,
        MapProjection::Flat => 40.0,
    };
    (
        50.0 + (point.longitude / 180.0) * k,
        50.0 - (point.latitude / 90.0) * k,
    )
}

/// Seeded stand-in for a z column that was never chosen.
#[derive(Debug)]
pub struct SurfaceNoise {
    rng: StdRng,
}

impl SurfaceNoise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(SURFACE_SEED),
        }
    }

    /// Next value in [0, 100).
    pub fn next_z(&mut self) -> f64 {
        self.rng.gen_range(0.0..100.0)
    }
}

impl Default for SurfaceNoise {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Blue-to-green shading by relative height (y) across the surface.
pub fn surface_shading(points: &[Point3]) -> Vec<Hsl> {
    let min = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    points
        .iter()
        .map(|p| {
            let n = if span > 0.0 { (p.y - min) / span } else { 0.0 };
            Hsl {
                hue: 240.0 - n * 120.0,
                saturation: 70.0,
                lightness: 50.0 + n * 30.0,
            }
        })
        .collect()
}
