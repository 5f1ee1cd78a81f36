//! Typed table operations available to the analytical agent
//!
//! The agent never runs code. Each step names one [`TableOp`], which is
//! executed against a read-only [`Table`] and rendered back as text.

use super::table::{render_rows, Table, Value};
use crate::error::{FinRouteError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum rows any operation renders back to the agent
pub const MAX_RENDERED_ROWS: usize = 50;

fn default_head() -> usize {
    5
}

fn default_row_limit() -> usize {
    20
}

/// A single operation on one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum TableOp {
    /// Columns, row count, and numeric column statistics
    Describe { dataset: String },

    /// First rows of the dataset
    Head {
        dataset: String,
        #[serde(default = "default_head")]
        n: usize,
    },

    /// Rows matching every filter
    Filter {
        dataset: String,
        filters: Vec<Filter>,
        #[serde(default = "default_row_limit")]
        limit: usize,
    },

    /// One aggregate over a column of the filtered rows
    Aggregate {
        dataset: String,
        #[serde(default)]
        filters: Vec<Filter>,
        column: String,
        func: AggFunc,
    },

    /// Aggregate a column per group
    GroupBy {
        dataset: String,
        #[serde(default)]
        filters: Vec<Filter>,
        by: String,
        /// Bucket a date column before grouping
        #[serde(default)]
        date_part: Option<DatePart>,
        column: String,
        func: AggFunc,
        #[serde(default)]
        sort: Option<SortOrder>,
        #[serde(default)]
        limit: Option<usize>,
    },

    /// Filtered rows ordered by a column
    Sort {
        dataset: String,
        #[serde(default)]
        filters: Vec<Filter>,
        column: String,
        #[serde(default)]
        order: SortOrder,
        #[serde(default = "default_row_limit")]
        limit: usize,
    },
}

impl TableOp {
    /// Dataset the operation reads
    pub fn dataset(&self) -> &str {
        match self {
            TableOp::Describe { dataset }
            | TableOp::Head { dataset, .. }
            | TableOp::Filter { dataset, .. }
            | TableOp::Aggregate { dataset, .. }
            | TableOp::GroupBy { dataset, .. }
            | TableOp::Sort { dataset, .. } => dataset,
        }
    }
}

/// Row predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: CompareOp,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggFunc {
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePart {
    Year,
    Quarter,
    Month,
    YearMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl Filter {
    fn matches(&self, cell: &Value, literal: &Value) -> bool {
        use std::cmp::Ordering::*;

        if cell.is_null() {
            return self.op == CompareOp::Ne && !literal.is_null();
        }

        match self.op {
            CompareOp::Eq => loose_eq(cell, literal),
            CompareOp::Ne => !loose_eq(cell, literal),
            CompareOp::Gt => cell.compare(literal) == Greater,
            CompareOp::Gte => cell.compare(literal) != Less,
            CompareOp::Lt => cell.compare(literal) == Less,
            CompareOp::Lte => cell.compare(literal) != Greater,
            CompareOp::Contains => cell
                .to_string()
                .to_lowercase()
                .contains(&literal.to_string().to_lowercase()),
            CompareOp::StartsWith => cell.to_string().starts_with(&literal.to_string()),
        }
    }
}

/// Equality that ignores ASCII case for text
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => x.eq_ignore_ascii_case(y),
        _ => a == b,
    }
}

fn apply_filters<'a>(table: &'a Table, filters: &[Filter]) -> Result<Vec<&'a Vec<Value>>> {
    let compiled: Vec<(usize, &Filter, Value)> = filters
        .iter()
        .map(|f| -> Result<(usize, &Filter, Value)> {
            Ok((table.column_index(&f.column)?, f, Value::from_json(&f.value)))
        })
        .collect::<Result<_>>()?;

    Ok(table
        .rows
        .iter()
        .filter(|row| {
            compiled
                .iter()
                .all(|(idx, filter, literal)| filter.matches(&row[*idx], literal))
        })
        .collect())
}

/// Apply an aggregate to the values of one column
pub fn aggregate(values: &[&Value], func: AggFunc) -> Value {
    if func == AggFunc::Count {
        return Value::Number(values.iter().filter(|v| !v.is_null()).count() as f64);
    }

    if matches!(func, AggFunc::Min | AggFunc::Max) {
        let non_null = values.iter().filter(|v| !v.is_null());
        let picked = if func == AggFunc::Min {
            non_null.min_by(|a, b| a.compare(b))
        } else {
            non_null.max_by(|a, b| a.compare(b))
        };
        return picked.map(|v| (*v).clone()).unwrap_or(Value::Null);
    }

    let mut numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
    if numbers.is_empty() {
        return Value::Null;
    }

    let result = match func {
        AggFunc::Sum => numbers.iter().sum(),
        AggFunc::Mean => numbers.iter().sum::<f64>() / numbers.len() as f64,
        AggFunc::Median => {
            numbers.sort_by(|a, b| a.total_cmp(b));
            let mid = numbers.len() / 2;
            if numbers.len() % 2 == 0 {
                (numbers[mid - 1] + numbers[mid]) / 2.0
            } else {
                numbers[mid]
            }
        }
        AggFunc::Count | AggFunc::Min | AggFunc::Max => unreachable!("handled above"),
    };
    Value::Number(result)
}

fn func_name(func: AggFunc) -> &'static str {
    match func {
        AggFunc::Count => "count",
        AggFunc::Sum => "sum",
        AggFunc::Mean => "mean",
        AggFunc::Median => "median",
        AggFunc::Min => "min",
        AggFunc::Max => "max",
    }
}

/// Parse the leading `YYYY-MM-DD` of a cell
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = match value {
        Value::Text(s) => s.as_str(),
        _ => return None,
    };
    let prefix = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text.get(..8).unwrap_or(text), "%Y%m%d"))
        .ok()
}

fn bucket(value: &Value, part: Option<DatePart>) -> Result<String> {
    let Some(part) = part else {
        return Ok(value.to_string());
    };
    let date = parse_date(value)
        .ok_or_else(|| FinRouteError::Dataset(format!("'{}' is not a date", value)))?;
    Ok(match part {
        DatePart::Year => date.year().to_string(),
        DatePart::Quarter => format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1),
        DatePart::Month => format!("{:02}", date.month()),
        DatePart::YearMonth => format!("{}-{:02}", date.year(), date.month()),
    })
}

/// Execute an operation and render its result as text
pub fn execute(table: &Table, op: &TableOp) -> Result<String> {
    match op {
        TableOp::Describe { .. } => Ok(describe(table)),

        TableOp::Head { n, .. } => {
            let rows: Vec<&Vec<Value>> = table.rows.iter().take((*n).min(MAX_RENDERED_ROWS)).collect();
            Ok(render_rows(&table.columns, &rows))
        }

        TableOp::Filter { filters, limit, .. } => {
            let rows = apply_filters(table, filters)?;
            let shown: Vec<&Vec<Value>> = rows
                .iter()
                .take((*limit).min(MAX_RENDERED_ROWS))
                .copied()
                .collect();
            Ok(format!(
                "{} matching rows (showing {})\n{}",
                rows.len(),
                shown.len(),
                render_rows(&table.columns, &shown)
            ))
        }

        TableOp::Aggregate {
            filters,
            column,
            func,
            ..
        } => {
            let idx = table.column_index(column)?;
            let rows = apply_filters(table, filters)?;
            let values: Vec<&Value> = rows.iter().map(|r| &r[idx]).collect();
            Ok(format!(
                "{}({}) = {} over {} rows",
                func_name(*func),
                column,
                aggregate(&values, *func),
                rows.len()
            ))
        }

        TableOp::GroupBy {
            filters,
            by,
            date_part,
            column,
            func,
            sort,
            limit,
            ..
        } => {
            let by_idx = table.column_index(by)?;
            let value_idx = table.column_index(column)?;
            let rows = apply_filters(table, filters)?;

            let mut groups: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
            for row in rows {
                if row[by_idx].is_null() {
                    continue;
                }
                groups
                    .entry(bucket(&row[by_idx], *date_part)?)
                    .or_default()
                    .push(&row[value_idx]);
            }

            let mut results: Vec<(String, Value)> = groups
                .into_iter()
                .map(|(key, values)| (key, aggregate(&values, *func)))
                .collect();

            match sort {
                Some(SortOrder::Asc) => results.sort_by(|a, b| a.1.compare(&b.1)),
                Some(SortOrder::Desc) => results.sort_by(|a, b| b.1.compare(&a.1)),
                None => {}
            }
            results.truncate(limit.unwrap_or(MAX_RENDERED_ROWS).min(MAX_RENDERED_ROWS));

            let mut out = format!("{} | {}({})", by, func_name(*func), column);
            for (key, value) in results {
                out.push_str(&format!("\n{} | {}", key, value));
            }
            Ok(out)
        }

        TableOp::Sort {
            filters,
            column,
            order,
            limit,
            ..
        } => {
            let idx = table.column_index(column)?;
            let mut rows = apply_filters(table, filters)?;
            rows.sort_by(|a, b| match order {
                SortOrder::Asc => a[idx].compare(&b[idx]),
                SortOrder::Desc => b[idx].compare(&a[idx]),
            });
            rows.truncate((*limit).min(MAX_RENDERED_ROWS));
            Ok(render_rows(&table.columns, &rows))
        }
    }
}

fn describe(table: &Table) -> String {
    let mut out = format!(
        "dataset {}: {} rows, columns: {}",
        table.name,
        table.len(),
        table.columns.join(", ")
    );

    for (idx, column) in table.columns.iter().enumerate() {
        if !table.is_numeric_column(idx) {
            continue;
        }
        let values: Vec<&Value> = table.rows.iter().map(|r| &r[idx]).collect();
        out.push_str(&format!(
            "\n{}: count={} mean={} min={} max={}",
            column,
            aggregate(&values, AggFunc::Count),
            aggregate(&values, AggFunc::Mean),
            aggregate(&values, AggFunc::Min),
            aggregate(&values, AggFunc::Max),
        ));
    }
    out
}
