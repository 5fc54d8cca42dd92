//! API error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use advisor::{InventoryError, LlmError};

/// Errors a handler can surface to the client.
///
/// Cancellation never appears here: a cancelled analysis is a successful
/// response with partial results, and project-level cancel always answers
/// 200.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::TaskNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidDateRange(_) => StatusCode::BAD_REQUEST,
            Self::Inventory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Misconfigured or missing provider credentials; per-resource
            // provider failures are absorbed by the engine instead.
            Self::Provider(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let response = ApiError::TaskNotFound("t-1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::InvalidDateRange("start after end".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError::Provider(LlmError::Auth("no key".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
