//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use payment_core::PaymentError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Payment domain error.
    Payment(PaymentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Payment(err) => payment_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, String) {
    match &err {
        PaymentError::InvalidAmount => (StatusCode::BAD_REQUEST, err.to_string()),
        PaymentError::TransactionNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        PaymentError::AlreadyResolved { .. } => (StatusCode::CONFLICT, err.to_string()),
        PaymentError::Gateway(reason) => {
            tracing::error!(%reason, "payment gateway failure");
            (
                StatusCode::BAD_GATEWAY,
                "payment processing failed".to_string(),
            )
        }
        PaymentError::Storage(storage) => {
            tracing::error!(error = %storage, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "processing failed".to_string(),
            )
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::Payment(err)
    }
}
