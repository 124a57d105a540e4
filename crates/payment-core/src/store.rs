//! Storage contract for the payment service.

use async_trait::async_trait;
use common::TransactionId;

use crate::error::Result;
use crate::transaction::{Transaction, TransactionStatus};

/// Storage operations for payment transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a new transaction.
    async fn insert(&self, transaction: Transaction) -> Result<()>;

    /// Loads a transaction by id.
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// Resolves a pending transaction to a terminal status.
    ///
    /// Applied as a single conditional update keyed on `Pending`, so a
    /// transaction resolves exactly once: a second attempt observes
    /// `AlreadyResolved` and mutates nothing.
    async fn resolve(&self, id: TransactionId, status: TransactionStatus) -> Result<Transaction>;
}
