//! JSON record collections for the data API

use super::Database;
use crate::error::{FinRouteError, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, types::Value as SqlValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stored document. The row id is never part of it.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Collections served by the data API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    CompanyOverview,
    CashFlow,
    QuarterlyEarnings,
    StockWeeklyData,
    NewsSentiment,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::CompanyOverview,
        Collection::CashFlow,
        Collection::QuarterlyEarnings,
        Collection::StockWeeklyData,
        Collection::NewsSentiment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::CompanyOverview => "company_overview",
            Collection::CashFlow => "cash_flow",
            Collection::QuarterlyEarnings => "quarterly_earnings",
            Collection::StockWeeklyData => "stock_weekly_data",
            Collection::NewsSentiment => "news_sentiment",
        }
    }

    /// Field holding the ticker symbol
    pub fn symbol_field(&self) -> &'static str {
        match self {
            Collection::CompanyOverview => "Symbol",
            Collection::NewsSentiment => "ticket_number",
            _ => "symbol",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = FinRouteError;

    fn from_str(s: &str) -> Result<Self> {
        Collection::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| FinRouteError::CollectionNotFound(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Equality filter, optional sort, optional limit
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    filter: Option<(String, Option<String>)>,
    sort: Option<(String, SortDirection)>,
    limit: Option<usize>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match records whose field equals `value`. `None` matches records
    /// where the field is missing or null.
    pub fn where_eq(mut self, field: impl Into<String>, value: Option<&str>) -> Self {
        self.filter = Some((field.into(), value.map(str::to_string)));
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn json_path(field: &str) -> Result<String> {
    if field.is_empty() || field.contains('"') || field.contains('\\') {
        return Err(FinRouteError::InvalidInput(format!(
            "invalid field name '{}'",
            field
        )));
    }
    Ok(format!("$.\"{}\"", field))
}

impl Database {
    /// Replace every record of a collection in one transaction
    pub fn replace_collection(&self, collection: Collection, records: &[Record]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        let removed = tx.execute(
            "DELETE FROM records WHERE collection = ?1",
            params![collection.name()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection, body, imported_at) VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                stmt.execute(params![
                    collection.name(),
                    serde_json::to_string(record)?,
                    now
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(
            "Replaced {} ({} removed, {} inserted)",
            collection,
            removed,
            records.len()
        );
        Ok(records.len())
    }

    /// Records matching the query, in sort order or insertion order
    pub fn find_records(&self, collection: Collection, query: &RecordQuery) -> Result<Vec<Record>> {
        let mut sql = String::from("SELECT body FROM records WHERE collection = ?");
        let mut args = vec![SqlValue::Text(collection.name().to_string())];

        if let Some((field, value)) = &query.filter {
            args.push(SqlValue::Text(json_path(field)?));
            match value {
                Some(value) => {
                    sql.push_str(" AND json_extract(body, ?) = ?");
                    args.push(SqlValue::Text(value.clone()));
                }
                None => sql.push_str(" AND json_extract(body, ?) IS NULL"),
            }
        }

        match &query.sort {
            Some((field, direction)) => {
                sql.push_str(&format!(
                    " ORDER BY json_extract(body, ?) {}, id ASC",
                    direction.sql()
                ));
                args.push(SqlValue::Text(json_path(field)?));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::Integer(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let bodies = stmt
            .query_map(params_from_iter(args), |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| Ok(serde_json::from_str::<Record>(body)?))
            .collect()
    }
}
