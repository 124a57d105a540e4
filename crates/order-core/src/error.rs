//! Order core error types.

use common::{OrderId, ProductId};
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The product does not have enough stock to cover the request.
    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },

    /// The order has already left `Created` and cannot be cancelled.
    #[error("order {0} cannot be cancelled")]
    NotCancellable(OrderId),

    /// The requested status change is not a legal transition.
    #[error("invalid transition for order {order_id}: {current} -> {requested}")]
    InvalidTransition {
        order_id: OrderId,
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// The requested quantity is not a positive integer.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be interpreted.
    #[error("unexpected value in storage: {0}")]
    Invalid(String),
}

/// Result type for order core operations.
pub type Result<T> = std::result::Result<T, OrderError>;
