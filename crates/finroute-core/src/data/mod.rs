//! Tabular datasets for the analytical engine
//!
//! Four CSV datasets are loaded once into read-only [`Table`]s and queried
//! through the enumerated operations in [`ops`].

pub mod ops;
mod table;

pub use ops::{execute, AggFunc, CompareOp, DatePart, Filter, SortOrder, TableOp};
pub use table::{render_rows, Table, Value};

use crate::config::DatasetPaths;
use crate::error::{FinRouteError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The analytical datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    StockWeeklyData,
    NewsSentiment,
    QuarterlyEarnings,
    CashFlow,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::StockWeeklyData,
        DatasetKind::NewsSentiment,
        DatasetKind::QuarterlyEarnings,
        DatasetKind::CashFlow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::StockWeeklyData => "stock_weekly_data",
            DatasetKind::NewsSentiment => "news_sentiment",
            DatasetKind::QuarterlyEarnings => "quarterly_earnings",
            DatasetKind::CashFlow => "cash_flow",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = FinRouteError;

    fn from_str(s: &str) -> Result<Self> {
        DatasetKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                FinRouteError::Dataset(format!(
                    "unknown dataset '{}'; available datasets: {}",
                    s,
                    DatasetKind::ALL.map(|k| k.name()).join(", ")
                ))
            })
    }
}

/// All analytical tables, keyed by [`DatasetKind`]
#[derive(Debug, Clone)]
pub struct Datasets {
    tables: Vec<(DatasetKind, Table)>,
}

impl Datasets {
    /// Load every dataset named in the config
    pub fn load(paths: &DatasetPaths) -> Result<Self> {
        let tables = DatasetKind::ALL
            .into_iter()
            .map(|kind| -> Result<(DatasetKind, Table)> {
                Ok((kind, Table::load(kind.name(), paths.path_for(kind))?))
            })
            .collect::<Result<Vec<_>>>()?;

        for (kind, table) in &tables {
            tracing::info!("Dataset {}: {} rows", kind, table.len());
        }
        Ok(Self { tables })
    }

    /// Build from already-parsed tables
    pub fn from_tables(tables: Vec<(DatasetKind, Table)>) -> Self {
        Self { tables }
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&Table> {
        self.tables.iter().find(|(k, _)| *k == kind).map(|(_, t)| t)
    }

    /// Look up a dataset by its snake_case name
    pub fn by_name(&self, name: &str) -> Result<&Table> {
        let kind: DatasetKind = name.parse()?;
        self.get(kind)
            .ok_or_else(|| FinRouteError::Dataset(format!("dataset '{}' is not loaded", name)))
    }

    /// Run one operation against the dataset it names
    pub fn run(&self, op: &TableOp) -> Result<String> {
        let table = self.by_name(op.dataset())?;
        execute(table, op)
    }

    /// One line per dataset listing its columns and row count
    pub fn catalog(&self) -> String {
        self.tables
            .iter()
            .map(|(kind, table)| {
                format!(
                    "- {} ({} rows): {}",
                    kind,
                    table.len(),
                    table.columns.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasets() -> Datasets {
        Datasets::from_tables(vec![
            (
                DatasetKind::CashFlow,
                Table::from_csv_str("cash_flow", "symbol,fiscalDateEnding,operatingCashflow\nAAPL,2023-09-30,110543000000\n").unwrap(),
            ),
            (
                DatasetKind::NewsSentiment,
                Table::from_csv_str("news_sentiment", "ticket_number,title,overall_sentiment_score\nAAPL,Apple beats,0.31\n").unwrap(),
            ),
        ])
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in DatasetKind::ALL {
            assert_eq!(kind.name().parse::<DatasetKind>().unwrap(), kind);
        }
        let err = "prices".parse::<DatasetKind>().unwrap_err().to_string();
        assert!(err.contains("stock_weekly_data, news_sentiment, quarterly_earnings, cash_flow"));
    }

    #[test]
    fn test_catalog() {
        let catalog = datasets().catalog();
        assert_eq!(
            catalog,
            "- cash_flow (1 rows): symbol, fiscalDateEnding, operatingCashflow\n\
- news_sentiment (1 rows): ticket_number, title, overall_sentiment_score"
        );
    }

    #[test]
    fn test_run_dispatches_by_dataset() {
        let op = TableOp::Describe {
            dataset: "news_sentiment".to_string(),
        };
        let out = datasets().run(&op).unwrap();
        assert!(out.starts_with("dataset news_sentiment: 1 rows"));

        let missing = TableOp::Describe {
            dataset: "quarterly_earnings".to_string(),
        };
        assert!(datasets().run(&missing).is_err());
    }

    #[test]
    fn test_load_from_paths() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut paths = DatasetPaths::default();
        for kind in DatasetKind::ALL {
            let path = temp.path().join(format!("{}.csv", kind));
            std::fs::write(&path, "symbol,value\nAAPL,1\nMSFT,2\n").unwrap();
            match kind {
                DatasetKind::StockWeeklyData => paths.stock_weekly_data = path,
                DatasetKind::NewsSentiment => paths.news_sentiment = path,
                DatasetKind::QuarterlyEarnings => paths.quarterly_earnings = path,
                DatasetKind::CashFlow => paths.cash_flow = path,
            }
        }

        let datasets = Datasets::load(&paths).unwrap();
        assert_eq!(datasets.len(), 4);
        assert_eq!(datasets.by_name("cash_flow").unwrap().len(), 2);
    }
}
