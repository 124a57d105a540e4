//! Payment core error types.

use common::TransactionId;
use thiserror::Error;

use crate::transaction::TransactionStatus;

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The requested amount is not positive.
    #[error("amount must be positive")]
    InvalidAmount,

    /// The referenced transaction does not exist.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The transaction has already been resolved; it is immutable now.
    #[error("transaction {id} already resolved to {status}")]
    AlreadyResolved {
        id: TransactionId,
        status: TransactionStatus,
    },

    /// The payment gateway could not produce an outcome.
    #[error("payment gateway unavailable: {0}")]
    Gateway(String),

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

    /// A stored value could not be interpreted.
    #[error("unexpected value in storage: {0}")]
    Invalid(String),
}

/// Result type for payment core operations.
pub type Result<T> = std::result::Result<T, PaymentError>;
