use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::TransactionId;
use tokio::sync::RwLock;

use crate::error::{PaymentError, Result};
use crate::store::TransactionStore;
use crate::transaction::{Transaction, TransactionStatus};

/// In-memory transaction store for testing and single-node deployments.
///
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
}

impl InMemoryTransactionStore {
    /// Creates a new empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored transactions.
    pub async fn transaction_count(&self) -> usize {
        self.transactions.read().await.len()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, transaction: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        Ok(self.transactions.read().await.get(&id).cloned())
    }

    async fn resolve(&self, id: TransactionId, status: TransactionStatus) -> Result<Transaction> {
        let mut transactions = self.transactions.write().await;
        let transaction = transactions
            .get_mut(&id)
            .ok_or(PaymentError::TransactionNotFound(id))?;

        if transaction.status != TransactionStatus::Pending {
            return Err(PaymentError::AlreadyResolved {
                id,
                status: transaction.status,
            });
        }

        transaction.status = status;
        transaction.updated_at = Utc::now();
        Ok(transaction.clone())
    }
}
