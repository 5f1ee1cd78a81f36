use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finroute_core::FinRouteError;
use serde_json::json;

/// Error converted into `{"error": message}` with a status code
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<FinRouteError> for ApiError {
    fn from(err: FinRouteError) -> Self {
        match err {
            FinRouteError::InvalidInput(_) => Self::bad_request(err.to_string()),
            FinRouteError::CollectionNotFound(_) => Self::not_found(err.to_string()),
            other => {
                tracing::error!("Data API error: {}", other);
                Self::internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
