use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::io::Read;

/// A single loosely-typed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

static MISSING: Value = Value::Missing;

/// One record, keyed by column name. Lookups of absent columns yield `Value::Missing`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> &Value {
        self.cells.get(column).unwrap_or(&MISSING)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Builder form of [`Row::insert`], handy for literal rows.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(|k| k.as_str())
    }
}

/// Tabular data as produced by the upload step: ordered column names plus rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read CSV with a header line. Empty cells and short records become `Missing`.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV record {}", idx + 1))?;
            let mut row = Row::new();
            for (col_idx, column) in columns.iter().enumerate() {
                let value = match record.get(col_idx) {
                    Some(cell) if !cell.is_empty() => Value::Text(cell.to_string()),
                    _ => Value::Missing,
                };
                row.insert(column.clone(), value);
            }
            rows.push(row);
        }

        tracing::debug!(columns = columns.len(), rows = rows.len(), "loaded CSV table");
        Ok(Self { columns, rows })
    }

    /// Create a table from a JSON array of objects.
    ///
    /// Columns are the keys of all objects in first-seen order, so rows that
    /// omit a key still line up.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(array.len());
        for (idx, item) in array.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Item {} in array must be an object", idx))?;

            let mut row = Row::new();
            for (key, raw) in obj {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
                let value = match raw {
                    JsonValue::String(s) => Value::Text(s.clone()),
                    JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
                    JsonValue::Bool(b) => Value::Text(b.to_string()),
                    JsonValue::Null => Value::Missing,
                    _ => {
                        return Err(anyhow!(
                            "Unsupported value type for field '{}' in item {}",
                            key,
                            idx
                        ))
                    }
                };
                row.insert(key.clone(), value);
            }
            rows.push(row);
        }

        tracing::debug!(columns = columns.len(), rows = rows.len(), "loaded JSON table");
        Ok(Self { columns, rows })
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let value: JsonValue =
            serde_json::from_reader(reader).context("Failed to parse JSON input")?;
        Self::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn csv_table(content: &str) -> Table {
        Table::from_csv(Cursor::new(content)).unwrap()
    }

    #[test]
    fn test_row_get_absent_column_is_missing() {
        let row = Row::new().with("a", 1.0);
        assert_eq!(row.get("a"), &Value::Number(1.0));
        assert_eq!(row.get("nope"), &Value::Missing);
    }

    #[test]
    fn test_read_csv_basic() {
        let table = csv_table("a,b,c\n1,2,3\n4,5,6");
        assert_eq!(table.columns, vec!["a", "b", "c"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("b"), &Value::Text("5".into()));
    }

    #[test]
    fn test_read_csv_headers_only_is_empty_table() {
        let table = csv_table("x,y\n");
        assert_eq!(table.columns, vec!["x", "y"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_read_csv_empty_cell_and_short_row_are_missing() {
        let table = csv_table("x,y,z\n1,,3\n2,20");
        assert!(table.rows[0].get("y").is_missing());
        assert!(table.rows[1].get("z").is_missing());
        assert_eq!(table.rows[1].get("y"), &Value::Text("20".into()));
    }

    #[test]
    fn test_read_csv_unicode() {
        let table = csv_table("x,température\n1,20.5");
        assert_eq!(table.columns, vec!["x", "température"]);
        assert_eq!(table.rows[0].get("température"), &Value::Text("20.5".into()));
    }

    #[test]
    fn test_from_json_value_kinds() {
        let input = json!([
            {"name": "A", "v": 10, "flag": true, "gone": null},
            {"name": "B", "extra": 2.5}
        ]);
        let table = Table::from_json(&input).unwrap();
        assert_eq!(table.columns, vec!["name", "v", "flag", "gone", "extra"]);
        assert_eq!(table.rows[0].get("v"), &Value::Number(10.0));
        assert_eq!(table.rows[0].get("flag"), &Value::Text("true".into()));
        assert!(table.rows[0].get("gone").is_missing());
        assert!(table.rows[1].get("v").is_missing());
        assert_eq!(table.rows[1].get("extra"), &Value::Number(2.5));
    }

    #[test]
    fn test_from_json_empty_array() {
        let table = Table::from_json(&json!([])).unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let result = Table::from_json(&json!({"a": 1}));
        assert!(result.unwrap_err().to_string().contains("JSON array"));
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        let result = Table::from_json(&json!([{"a": [1, 2]}]));
        assert!(result.unwrap_err().to_string().contains("Unsupported value type"));
    }
}
