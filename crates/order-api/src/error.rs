//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use order_core::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Signature verification failed. Deliberately carries no detail about
    /// which check failed.
    Unauthorized,
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Order domain error.
    Order(OrderError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid signature".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "processing failed".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::ProductNotFound(_) | OrderError::OrderNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        OrderError::InsufficientStock { .. }
        | OrderError::NotCancellable(_)
        | OrderError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        OrderError::InvalidQuantity => (StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::Storage(storage) => {
            // Storage internals stay out of responses.
            tracing::error!(error = %storage, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "processing failed".to_string(),
            )
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}
