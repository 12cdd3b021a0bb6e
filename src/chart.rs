use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart families offered by the chart creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Bubble,
    Column3d,
    Bar3d,
    Surface3d,
    Map3d,
    Terrain3d,
    Bubble3d,
}

impl ChartType {
    pub const ALL: [ChartType; 12] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::Area,
        ChartType::Bubble,
        ChartType::Column3d,
        ChartType::Bar3d,
        ChartType::Surface3d,
        ChartType::Map3d,
        ChartType::Terrain3d,
        ChartType::Bubble3d,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Area => "area",
            ChartType::Bubble => "bubble",
            ChartType::Column3d => "column3d",
            ChartType::Bar3d => "bar3d",
            ChartType::Surface3d => "surface3d",
            ChartType::Map3d => "map3d",
            ChartType::Terrain3d => "terrain3d",
            ChartType::Bubble3d => "bubble3d",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChartType::Bar => "Bar Chart",
            ChartType::Line => "Line Chart",
            ChartType::Pie => "Pie Chart",
            ChartType::Scatter => "Scatter Plot",
            ChartType::Area => "Area Chart",
            ChartType::Bubble => "Bubble Chart",
            ChartType::Column3d => "3D Column Chart",
            ChartType::Bar3d => "3D Bar Chart",
            ChartType::Surface3d => "3D Surface Chart",
            ChartType::Map3d => "3D Geographic Map",
            ChartType::Terrain3d => "3D Terrain Chart",
            ChartType::Bubble3d => "3D Bubble Chart",
        }
    }

    pub fn is_3d(self) -> bool {
        self.tag().ends_with("3d")
    }

    /// Whether the chart creator demands a z column for this type.
    pub fn requires_z(self) -> bool {
        matches!(
            self,
            ChartType::Surface3d | ChartType::Terrain3d | ChartType::Bubble3d
        )
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ChartType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        ChartType::ALL
            .into_iter()
            .find(|t| t.tag() == lowered)
            .ok_or_else(|| {
                let known: Vec<&str> = ChartType::ALL.iter().map(|t| t.tag()).collect();
                anyhow!("Unknown chart type '{}'. Expected one of: {}", s, known.join(", "))
            })
    }
}

/// User's chart choice: family, title and the x/y(/z) column bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub title: String,
    pub chart_type: ChartType,
    pub x_field: String,
    pub y_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_field: Option<String>,
}

impl ChartSpec {
    pub fn new(
        title: impl Into<String>,
        chart_type: ChartType,
        x_field: impl Into<String>,
        y_field: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            default_title(chart_type)
        } else {
            title
        };
        Self {
            title,
            chart_type,
            x_field: x_field.into(),
            y_field: y_field.into(),
            z_field: None,
        }
    }

    pub fn with_z(mut self, z_field: impl Into<String>) -> Self {
        let z = z_field.into();
        self.z_field = if z.is_empty() { None } else { Some(z) };
        self
    }

    /// Problems with the field bindings against the available columns.
    ///
    /// Preparation tolerates all of these, so they are advisory only.
    pub fn field_warnings(&self, columns: &[String]) -> Vec<String> {
        let unknown = |axis: &str, field: &str| {
            (!columns.iter().any(|c| c == field))
                .then(|| format!("{} field '{}' is not a column of the table", axis, field))
        };

        let mut warnings: Vec<String> = [("x", &self.x_field), ("y", &self.y_field)]
            .into_iter()
            .filter_map(|(axis, field)| unknown(axis, field.as_str()))
            .collect();
        match &self.z_field {
            Some(z) => warnings.extend(unknown("z", z.as_str())),
            None if self.chart_type.requires_z() => warnings.push(format!(
                "{} expects a z field; none was given",
                self.chart_type.display_name()
            )),
            None => {}
        }
        warnings
    }
}

fn default_title(chart_type: ChartType) -> String {
    if chart_type.is_3d() {
        chart_type.display_name().to_string()
    } else {
        "Untitled Chart".to_string()
    }
}
