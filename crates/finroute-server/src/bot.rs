//! `POST /bot`

use crate::error::ApiError;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

/// Route the question in `{"query": ...}` to one engine.
///
/// A missing, empty or whitespace-only query is a 400. A routing failure
/// is reported as `{"error": ...}` with status 200, which existing clients
/// rely on.
pub(crate) async fn handle_bot(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let query = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.get("query").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    if query.trim().is_empty() {
        return Err(ApiError::bad_request("Query is required"));
    }

    match state.router.route(&query).await {
        Ok(response) => Ok(Json(json!({ "response": response }))),
        Err(e) => {
            tracing::error!("Routing failed: {}", e);
            Ok(Json(json!({ "error": e.to_string() })))
        }
    }
}
