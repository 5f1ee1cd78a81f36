//! Read-only stock data API over the document store

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDateTime;
use finroute_core::{Collection, Record, RecordQuery, SortDirection};
use serde::Deserialize;
use serde_json::{json, Value};

/// Fields `company_overview` may be sorted by
const OVERVIEW_SORT_FIELDS: [&str; 5] = ["Name", "Symbol", "PEGRatio", "MarketCapitalization", "Beta"];

const DEFAULT_OVERVIEW_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DataParams {
    symbol: Option<String>,
    sort_field: Option<String>,
    sort_order: Option<String>,
    limit: Option<String>,
}

impl DataParams {
    fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref().filter(|s| !s.is_empty())
    }

    fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref().filter(|s| !s.is_empty())
    }

    fn sort_order(&self) -> &str {
        self.sort_order.as_deref().unwrap_or("asc")
    }

    /// Unparseable limits fall back to the default
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or(DEFAULT_OVERVIEW_LIMIT)
    }
}

async fn find(state: &AppState, collection: Collection, query: RecordQuery) -> Result<Vec<Record>, ApiError> {
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || {
        let db = db
            .lock()
            .map_err(|_| ApiError::internal("document store lock poisoned"))?;
        db.find_records(collection, &query).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?
}

/// `GET /api/company_overview`
pub(crate) async fn company_overview(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<Value>, ApiError> {
    let collection = Collection::CompanyOverview;

    if let Some(symbol) = params.symbol() {
        let query = RecordQuery::new()
            .where_eq(collection.symbol_field(), Some(symbol))
            .limit(1);
        return match find(&state, collection, query).await?.into_iter().next() {
            Some(company) => Ok(Json(json!({ "response": company }))),
            None => Err(ApiError::not_found("Company not found")),
        };
    }

    let Some(sort_field) = params.sort_field() else {
        return Err(ApiError::bad_request("Symbol or sort_field parameter is required"));
    };
    if !OVERVIEW_SORT_FIELDS.contains(&sort_field) {
        return Err(ApiError::bad_request("Invalid sort_field"));
    }
    let direction = match params.sort_order() {
        "asc" => SortDirection::Ascending,
        "desc" => SortDirection::Descending,
        _ => return Err(ApiError::bad_request("Invalid sort_order")),
    };

    let query = RecordQuery::new()
        .sort_by(sort_field, direction)
        .limit(params.limit());
    let companies = find(&state, collection, query).await?;
    if companies.is_empty() {
        return Err(ApiError::not_found("No companies found"));
    }
    Ok(Json(json!({ "response": companies })))
}

/// Records for one symbol, optionally sorted. Any order other than `asc`
/// sorts descending.
async fn symbol_records(
    state: &AppState,
    collection: Collection,
    params: &DataParams,
) -> Result<Vec<Record>, ApiError> {
    let mut query = RecordQuery::new().where_eq(collection.symbol_field(), params.symbol.as_deref());
    if let Some(field) = params.sort_field() {
        let direction = if params.sort_order() == "asc" {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        query = query.sort_by(field, direction);
    }

    let records = find(state, collection, query).await?;
    if records.is_empty() {
        return Err(ApiError::not_found("Data not found"));
    }
    Ok(records)
}

/// `GET /api/cash_flow`
pub(crate) async fn cash_flow(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(symbol_records(&state, Collection::CashFlow, &params).await?))
}

/// `GET /api/quarterly_earnings`
pub(crate) async fn quarterly_earnings(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(
        symbol_records(&state, Collection::QuarterlyEarnings, &params).await?,
    ))
}

/// `GET /api/stock_weekly_data`
pub(crate) async fn stock_weekly_data(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(
        symbol_records(&state, Collection::StockWeeklyData, &params).await?,
    ))
}

/// `GET /api/news_sentiment`
pub(crate) async fn news_sentiment(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let mut records = symbol_records(&state, Collection::NewsSentiment, &params).await?;
    for record in &mut records {
        if let Some(Value::String(raw)) = record.get("time_published") {
            if let Some(formatted) = format_time_published(raw) {
                record.insert("time_published".to_string(), Value::String(formatted));
            }
        }
    }
    Ok(Json(records))
}

/// `20240105T143000` becomes `2024/01/05 14:30`
fn format_time_published(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| dt.format("%Y/%m/%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_published() {
        assert_eq!(
            format_time_published("20240105T143000").as_deref(),
            Some("2024/01/05 14:30")
        );
        assert_eq!(format_time_published("yesterday"), None);
    }

    #[test]
    fn test_params_defaults() {
        let params = DataParams {
            limit: Some("lots".to_string()),
            symbol: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.limit(), DEFAULT_OVERVIEW_LIMIT);
        assert_eq!(params.sort_order(), "asc");
        assert!(params.symbol().is_none());
    }
}
