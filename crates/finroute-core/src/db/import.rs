//! Load dataset CSV files into record collections

use super::{Collection, Database, Record};
use crate::config::DatasetPaths;
use crate::data::Value;
use crate::error::{FinRouteError, Result};
use csv::ReaderBuilder;
use std::path::Path;

impl Collection {
    /// CSV file a collection is imported from
    pub fn source_path<'a>(&self, paths: &'a DatasetPaths) -> &'a Path {
        match self {
            Collection::CompanyOverview => &paths.company_overview,
            Collection::CashFlow => &paths.cash_flow,
            Collection::QuarterlyEarnings => &paths.quarterly_earnings,
            Collection::StockWeeklyData => &paths.stock_weekly_data,
            Collection::NewsSentiment => &paths.news_sentiment,
        }
    }
}

fn to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Number(n) => serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s),
        Value::Null => serde_json::Value::Null,
    }
}

fn symbol_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Value::Null
    } else {
        Value::Text(trimmed.to_string())
    }
}

/// Parse CSV text into records, typing numeric cells as numbers
///
/// The collection's symbol column always stays text so lookups by ticker
/// match; an empty symbol cell is stored as null.
pub fn parse_records(csv_text: &str, collection: Collection) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() || header == "_id" {
                continue;
            }
            let cell = match row.get(i) {
                Some(raw) if header == collection.symbol_field() => symbol_cell(raw),
                Some(raw) => Value::parse(raw),
                None => Value::Null,
            };
            record.insert(header.clone(), to_json(cell));
        }
        records.push(record);
    }
    Ok(records)
}

impl Database {
    /// Replace a collection with the rows of a CSV file
    pub fn import_csv(&self, collection: Collection, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FinRouteError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {:?}: {}", path, e),
            ))
        })?;
        let records = parse_records(&text, collection)?;
        let count = self.replace_collection(collection, &records)?;
        tracing::info!("Imported {} records into {}", count, collection);
        Ok(count)
    }

    /// Import every collection from its configured CSV
    pub fn import_all(&self, paths: &DatasetPaths) -> Result<Vec<(Collection, usize)>> {
        Collection::ALL
            .into_iter()
            .map(|c| -> Result<(Collection, usize)> {
                Ok((c, self.import_csv(c, c.source_path(paths))?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RecordQuery;

    #[test]
    fn test_parse_records_types_cells() {
        let records = parse_records(
            "_id,symbol,fiscalDateEnding,operatingCashflow,note\n\
             1,AAPL,2023-09-30,110543000000,None\n\
             2,MSFT,2023-06-30,,ok\n",
            Collection::CashFlow,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert!(!records[0].contains_key("_id"));
        assert_eq!(records[0]["symbol"], "AAPL");
        assert_eq!(records[0]["operatingCashflow"].as_f64(), Some(110543000000.0));
        assert!(records[0]["note"].is_null());
        assert!(records[1]["operatingCashflow"].is_null());
    }

    #[test]
    fn test_symbol_column_stays_text() {
        let records = parse_records(
            "symbol,close\nNAN,1.5\nNone,2\n1234,3\n,4\n",
            Collection::StockWeeklyData,
        )
        .unwrap();

        assert_eq!(records[0]["symbol"], "NAN");
        assert_eq!(records[1]["symbol"], "None");
        assert_eq!(records[2]["symbol"], "1234");
        assert!(records[3]["symbol"].is_null());
        assert_eq!(records[2]["close"].as_f64(), Some(3.0));

        let news =
            parse_records("ticket_number,title\n1234,Listing\n", Collection::NewsSentiment)
                .unwrap();
        assert_eq!(news[0]["ticket_number"], "1234");
    }

    #[test]
    fn test_numeric_ticker_lookup() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("cash_flow.csv");
        std::fs::write(&path, "symbol,operatingCashflow\n1234,10\nAAPL,20\n").unwrap();

        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.import_csv(Collection::CashFlow, &path).unwrap();

        let found = db
            .find_records(
                Collection::CashFlow,
                &RecordQuery::new().where_eq("symbol", Some("1234")),
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["operatingCashflow"].as_f64(), Some(10.0));
    }

    #[test]
    fn test_import_all() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut paths = DatasetPaths::default();
        for c in Collection::ALL {
            let path = temp.path().join(format!("{}.csv", c));
            let field = c.symbol_field();
            std::fs::write(&path, format!("{},value\nAAPL,1\nMSFT,2\n", field)).unwrap();
            match c {
                Collection::CompanyOverview => paths.company_overview = path,
                Collection::CashFlow => paths.cash_flow = path,
                Collection::QuarterlyEarnings => paths.quarterly_earnings = path,
                Collection::StockWeeklyData => paths.stock_weekly_data = path,
                Collection::NewsSentiment => paths.news_sentiment = path,
            }
        }

        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let counts = db.import_all(&paths).unwrap();
        assert_eq!(counts.len(), 5);
        assert!(counts.iter().all(|(_, n)| *n == 2));

        // Re-import replaces rather than appends
        db.import_csv(Collection::CashFlow, &paths.cash_flow).unwrap();
        let cash_flow = db
            .find_records(Collection::CashFlow, &RecordQuery::new())
            .unwrap();
        assert_eq!(cash_flow.len(), 2);

        let news = db
            .find_records(
                Collection::NewsSentiment,
                &RecordQuery::new().where_eq("ticket_number", Some("MSFT")),
            )
            .unwrap();
        assert_eq!(news.len(), 1);
    }
}
