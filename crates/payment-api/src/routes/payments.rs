//! Payment transaction endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Money, TransactionId};
use payment_core::{PaymentService, Transaction, TransactionStore};
use serde::Deserialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: TransactionStore> {
    pub service: PaymentService<S>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: String,
    pub amount: Money,
}

// -- Handlers --

/// POST /payments — create and resolve a payment for an order.
///
/// The response carries the resolved transaction whether or not the
/// order-service notification got through; delivery is best-effort.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: TransactionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    if req.order_id.is_empty() {
        return Err(ApiError::BadRequest("order_id is required".to_string()));
    }

    let transaction = state.service.create_payment(req.order_id, req.amount).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /payments/:id — load a transaction by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: TransactionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction_id: TransactionId = id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid transaction id".to_string()))?;

    let transaction = state
        .service
        .get_transaction(transaction_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("transaction {id} not found")))?;
    Ok(Json(transaction))
}
