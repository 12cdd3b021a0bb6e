//! Saved-chart history (mocked backend).
//!
//! Charts are persisted as a flat label/value projection of the prepared
//! series, not as the series itself, so they can be listed and redrawn without
//! the source rows.

use crate::chart::{ChartSpec, ChartType};
use crate::coerce::format_number;
use crate::prepare::PreparedSeries;
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Chart {0} not found")]
    NotFound(String),
    #[error("Chart {0} belongs to another user")]
    Forbidden(String),
    #[error("History file I/O failed")]
    Io(#[from] std::io::Error),
    #[error("History file is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// The persisted projection of a prepared chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecord {
    pub chart_type: ChartType,
    pub x_axis: String,
    pub y_axis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_axis: Option<String>,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartRecord {
    /// Flatten any series shape into parallel labels/values, one entry per series item.
    ///
    /// Pairs keep x as the label and y as the value; triples label by `(x, y)`
    /// and keep z; map points keep their place label and value.
    pub fn from_series(spec: &ChartSpec, series: &PreparedSeries) -> Self {
        let (labels, values): (Vec<String>, Vec<f64>) = match series {
            PreparedSeries::Categorical { labels, values }
            | PreparedSeries::Labeled { labels, values } => (labels.clone(), values.clone()),
            PreparedSeries::Pairs { points } => {
                points.iter().map(|p| (format_number(p.x), p.y)).unzip()
            }
            PreparedSeries::Triples { points } => points
                .iter()
                .map(|p| (format!("({}, {})", format_number(p.x), format_number(p.y)), p.z))
                .unzip(),
            PreparedSeries::Geographic { points } => {
                points.iter().map(|p| (p.label.clone(), p.value)).unzip()
            }
        };

        Self {
            chart_type: spec.chart_type,
            x_axis: spec.x_field.clone(),
            y_axis: spec.y_field.clone(),
            z_axis: spec.z_field.clone(),
            labels,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedChart {
    pub id: String,
    pub user_id: String,
    pub file_id: String,
    pub title: String,
    #[serde(flatten)]
    pub record: ChartRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user chart history. Regular users only see their own charts; admins see all.
pub trait HistoryStore {
    fn save(
        &mut self,
        session: &Session,
        file_id: &str,
        title: &str,
        record: ChartRecord,
    ) -> Result<SavedChart, HistoryError>;

    /// Visible charts, newest first.
    fn list(&self, session: &Session) -> Vec<SavedChart>;

    fn get(&self, session: &Session, id: &str) -> Result<SavedChart, HistoryError>;

    fn delete(&mut self, session: &Session, id: &str) -> Result<(), HistoryError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryHistory {
    charts: Vec<SavedChart>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; a file that does not exist yet is an empty history.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        match File::open(path) {
            Ok(file) => Ok(serde_json::from_reader(BufReader::new(file))?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn persist(&self, path: &Path) -> Result<(), HistoryError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    fn position(&self, session: &Session, id: &str) -> Result<usize, HistoryError> {
        let idx = self
            .charts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
        if !session.is_admin() && self.charts[idx].user_id != session.user_id() {
            return Err(HistoryError::Forbidden(id.to_string()));
        }
        Ok(idx)
    }
}

impl HistoryStore for InMemoryHistory {
    fn save(
        &mut self,
        session: &Session,
        file_id: &str,
        title: &str,
        record: ChartRecord,
    ) -> Result<SavedChart, HistoryError> {
        let now = Utc::now();
        let chart = SavedChart {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id().to_string(),
            file_id: file_id.to_string(),
            title: title.to_string(),
            record,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(id = %chart.id, user = session.user_id(), "saved chart");
        self.charts.push(chart.clone());
        Ok(chart)
    }

    fn list(&self, session: &Session) -> Vec<SavedChart> {
        self.charts
            .iter()
            .rev()
            .filter(|c| session.is_admin() || c.user_id == session.user_id())
            .cloned()
            .collect()
    }

    fn get(&self, session: &Session, id: &str) -> Result<SavedChart, HistoryError> {
        let idx = self.position(session, id)?;
        Ok(self.charts[idx].clone())
    }

    fn delete(&mut self, session: &Session, id: &str) -> Result<(), HistoryError> {
        let idx = self.position(session, id)?;
        self.charts.remove(idx);
        tracing::info!(id, user = session.user_id(), "deleted chart");
        Ok(())
    }
}
