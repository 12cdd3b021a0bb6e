//! Offline chart suggestions and summaries, used when no insight service is reachable.

use crate::chart::ChartType;
use crate::coerce::{format_number, to_number_opt};
use crate::data::Row;
use serde::Serialize;

const NUMERIC_HINTS: &[&str] = &["amount", "value", "price", "sales", "profit"];
const TIME_HINTS: &[&str] = &["date", "time", "month", "year"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSuggestion {
    pub chart_type: ChartType,
    pub reasoning: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataInsight {
    pub summary: String,
    pub trends: Vec<String>,
    pub recommendations: Vec<String>,
}

fn mentions_any(column: &str, hints: &[&str]) -> bool {
    let lowered = column.to_lowercase();
    hints.iter().any(|h| lowered.contains(h))
}

/// Guess a chart type from column names alone.
pub fn suggest_chart(columns: &[String]) -> ChartSuggestion {
    let numeric = columns.iter().filter(|c| mentions_any(c, NUMERIC_HINTS)).count();
    let temporal = columns.iter().filter(|c| mentions_any(c, TIME_HINTS)).count();

    let (chart_type, reasoning, confidence) = if temporal > 0 && numeric > 0 {
        (
            ChartType::Line,
            "Time-based data is best visualized with line charts to show trends over time.",
            0.8,
        )
    } else if numeric >= 2 {
        (
            ChartType::Scatter,
            "Multiple numeric columns suggest correlation analysis with scatter plots.",
            0.7,
        )
    } else {
        (
            ChartType::Bar,
            "Bar charts are versatile for comparing categorical data.",
            0.6,
        )
    };

    ChartSuggestion {
        chart_type,
        reasoning: reasoning.to_string(),
        confidence,
    }
}

/// Average, minimum and maximum over the numeric cells of `y_field`.
pub fn summarize(rows: &[Row], y_field: &str) -> DataInsight {
    let values: Vec<f64> = rows.iter().filter_map(|r| to_number_opt(r.get(y_field))).collect();
    let recommendations = vec![
        "Consider analyzing outliers for deeper insights".to_string(),
        "Look for seasonal patterns if time-based data".to_string(),
        "Compare with industry benchmarks".to_string(),
    ];

    if values.is_empty() {
        return DataInsight {
            summary: format!("{} has no numeric values to analyze.", y_field),
            trends: Vec::new(),
            recommendations,
        };
    }

    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    DataInsight {
        summary: format!(
            "Analysis of {} shows an average value of {:.2}, with a range from {} to {}.",
            y_field,
            avg,
            format_number(min),
            format_number(max)
        ),
        trends: vec![
            format!("Highest value: {}", format_number(max)),
            format!("Lowest value: {}", format_number(min)),
            format!("Average: {:.2}", avg),
        ],
        recommendations,
    }
}
