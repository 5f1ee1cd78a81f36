//! In-memory tables loaded from CSV

use crate::error::{FinRouteError, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// A single cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Parse a raw CSV field: numbers become `Number`, blanks and NaN
    /// markers become `Null`, everything else stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return Value::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    /// Convert a JSON literal from an agent action into a cell value
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::parse(s),
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Null => Value::Null,
            other => Value::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Total order used by sorting and comparisons: nulls first, then
    /// numbers, then text.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{:.4}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "NaN"),
        }
    }
}

/// Named table with a fixed column set
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Load a CSV file with a header row
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FinRouteError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read dataset {:?}: {}", path, e),
            ))
        })?;
        Self::from_csv_str(name, &text)
    }

    /// Parse CSV text with a header row. Short rows are padded with nulls.
    pub fn from_csv_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for (row_num, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                FinRouteError::Dataset(format!(
                    "{}: failed to parse row {}: {}",
                    name,
                    row_num + 1,
                    e
                ))
            })?;
            let mut row: Vec<Value> = record.iter().map(Value::parse).collect();
            row.resize(columns.len(), Value::Null);
            rows.push(row);
        }

        tracing::debug!("Loaded dataset {} ({} rows)", name, rows.len());
        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    /// Position of a column, with the available columns in the error
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                FinRouteError::Dataset(format!(
                    "column '{}' not found in {}; available columns: {}",
                    column,
                    self.name,
                    self.columns.join(", ")
                ))
            })
    }

    /// Whether every non-null value in the column is numeric
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut seen = false;
        for row in &self.rows {
            match &row[idx] {
                Value::Number(_) => seen = true,
                Value::Null => {}
                Value::Text(_) => return false,
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render rows as a pipe-separated text table
pub fn render_rows(columns: &[String], rows: &[&Vec<Value>]) -> String {
    let mut out = columns.join(" | ");
    for row in rows {
        out.push('\n');
        out.push_str(
            &row.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEKLY: &str = "symbol,date,close,volume\n\
AAPL,2023-01-06,129.62,1000\n\
AAPL,2023-01-13,134.76,\n\
MSFT,2023-01-06,224.93,2000\n";

    #[test]
    fn test_parse_values() {
        assert_eq!(Value::parse("12.5"), Value::Number(12.5));
        assert_eq!(Value::parse(" -3 "), Value::Number(-3.0));
        assert_eq!(Value::parse(""), Value::Null);
        assert_eq!(Value::parse("NaN"), Value::Null);
        assert_eq!(Value::parse("None"), Value::Null);
        assert_eq!(Value::parse("AAPL"), Value::Text("AAPL".to_string()));
        assert_eq!(Value::parse("inf"), Value::Text("inf".to_string()));
    }

    #[test]
    fn test_from_csv() {
        let table = Table::from_csv_str("stock_weekly_data", WEEKLY).unwrap();
        assert_eq!(table.columns, vec!["symbol", "date", "close", "volume"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[1][3], Value::Null);
        assert!(table.is_numeric_column(2));
        assert!(!table.is_numeric_column(0));
    }

    #[test]
    fn test_missing_column_lists_available() {
        let table = Table::from_csv_str("stock_weekly_data", WEEKLY).unwrap();
        let err = table.column_index("price").unwrap_err().to_string();
        assert!(err.contains("column 'price' not found"));
        assert!(err.contains("symbol, date, close, volume"));
    }

    #[test]
    fn test_compare_order() {
        let mut values = vec![
            Value::Text("b".into()),
            Value::Number(2.0),
            Value::Null,
            Value::Number(-1.0),
            Value::Text("a".into()),
        ];
        values.sort_by(|a, b| a.compare(b));
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Number(-1.0),
                Value::Number(2.0),
                Value::Text("a".into()),
                Value::Text("b".into()),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(3.14159).to_string(), "3.1416");
        assert_eq!(Value::Null.to_string(), "NaN");
    }

    #[test]
    fn test_render_rows() {
        let table = Table::from_csv_str("t", "a,b\n1,x\n").unwrap();
        let rows: Vec<&Vec<Value>> = table.rows.iter().collect();
        assert_eq!(render_rows(&table.columns, &rows), "a | b\n1 | x");
    }
}
