// Library exports for chartprep

pub mod chart;
pub mod coerce;
pub mod data;
pub mod export;
pub mod graph;
pub mod history;
pub mod insights;
pub mod prepare;
pub mod session;
pub mod synthesize;

pub use chart::{ChartSpec, ChartType};
pub use data::{Row, Table, Value};
pub use prepare::{prepare, PreparedSeries};
pub use synthesize::{synthesize_geography, GeoPoint};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "json")]
    #[default]
    Json,
    #[serde(rename = "png")]
    Png,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

/// Largest accepted preview width or height, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Json,
        }
    }
}

impl RenderOptions {
    /// Parse options given as a JSON object; blank input means defaults.
    pub fn from_json_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let options: Self = serde_json::from_str(input).context("Invalid render options JSON")?;
        if options.width > MAX_DIMENSION || options.height > MAX_DIMENSION {
            anyhow::bail!(
                "Invalid render options: {}x{} exceeds the {}px limit",
                options.width,
                options.height,
                MAX_DIMENSION
            );
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_defaults() {
        let opts = RenderOptions::from_json_str("").unwrap();
        assert_eq!((opts.width, opts.height, opts.format), (800, 600, OutputFormat::Json));

        let partial = RenderOptions::from_json_str(r#"{"width": 320}"#).unwrap();
        assert_eq!((partial.width, partial.height), (320, 600));
    }

    #[test]
    fn test_render_options_format() {
        let opts = RenderOptions::from_json_str(r#"{"type": "png", "height": 200}"#).unwrap();
        assert_eq!(opts.format, OutputFormat::Png);
        assert_eq!(opts.height, 200);
        assert!(RenderOptions::from_json_str(r#"{"type": "gif"}"#).is_err());
    }

    #[test]
    fn test_render_options_size_limit() {
        let err = RenderOptions::from_json_str(r#"{"type": "png", "width": 40000, "height": 40000}"#)
            .unwrap_err();
        assert!(err.to_string().contains("limit"), "{}", err);

        let edge = RenderOptions::from_json_str(r#"{"width": 8192, "height": 8192}"#).unwrap();
        assert_eq!(edge.width, MAX_DIMENSION);
    }
}
