//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CustomerId, OrderId, ProductId};
use order_core::{NewOrder, Order, OrderService, OrderStore};
use serde::Deserialize;
use signer::RequestSigner;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub service: OrderService<S>,
    pub signer: RequestSigner,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub customer_id: String,
}

// -- Handlers --

/// POST /orders — create an order, reserving stock atomically.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    if req.customer_id.is_empty() {
        return Err(ApiError::BadRequest("customer_id is required".to_string()));
    }
    if req.product_id.is_empty() {
        return Err(ApiError::BadRequest("product_id is required".to_string()));
    }

    let order = state
        .service
        .create_order(NewOrder {
            customer_id: CustomerId::new(req.customer_id),
            product_id: ProductId::new(req.product_id),
            quantity: req.quantity,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .service
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {id} not found")))?;
    Ok(Json(order))
}

/// GET /orders — list a customer's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .service
        .orders_for_customer(&CustomerId::new(params.customer_id))
        .await?;
    Ok(Json(orders))
}

/// POST /orders/:id/cancel — cancel an order still in `Created`, restoring
/// its stock.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.service.cancel_order(order_id).await?;
    Ok(Json(order))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|_| ApiError::BadRequest("invalid order id".to_string()))
}
