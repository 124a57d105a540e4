//! Payment service: persists a transaction, resolves its outcome through
//! the gateway strategy, and emits one signed notification.

use std::sync::Arc;
use std::time::Duration;

use common::{Money, TransactionId};

use crate::error::{PaymentError, Result};
use crate::gateway::{GatewayOutcome, PaymentGateway};
use crate::notifier::OrderNotifier;
use crate::store::TransactionStore;
use crate::transaction::{Transaction, TransactionStatus};

/// High-level API over a [`TransactionStore`], a gateway strategy, and the
/// order notifier.
pub struct PaymentService<S> {
    store: S,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn OrderNotifier>,
    gateway_timeout: Duration,
}

impl<S: TransactionStore> PaymentService<S> {
    /// Creates a payment service with a 10-second gateway timeout.
    pub fn new(store: S, gateway: Arc<dyn PaymentGateway>, notifier: Arc<dyn OrderNotifier>) -> Self {
        Self::with_gateway_timeout(store, gateway, notifier, Duration::from_secs(10))
    }

    /// Creates a payment service with an explicit gateway timeout.
    pub fn with_gateway_timeout(
        store: S,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn OrderNotifier>,
        gateway_timeout: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            gateway_timeout,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates and resolves a payment for an order.
    ///
    /// Persists a `Pending` transaction, resolves the outcome through the
    /// gateway under a bounded timeout, records the terminal status, and
    /// attempts exactly one signed notification to the order service.
    ///
    /// Notification delivery is best-effort: a failure is logged and the
    /// caller still receives the resolved transaction. An unreachable order
    /// service therefore leaves the order un-confirmed until it is
    /// reconciled out of band.
    #[tracing::instrument(skip(self))]
    pub async fn create_payment(&self, order_id: String, amount: Money) -> Result<Transaction> {
        if !amount.is_positive() {
            return Err(PaymentError::InvalidAmount);
        }

        let transaction = Transaction::pending(order_id, amount);
        self.store.insert(transaction.clone()).await?;
        metrics::counter!("payment_transactions_total").increment(1);

        let outcome = tokio::time::timeout(
            self.gateway_timeout,
            self.gateway.resolve(&transaction.order_id, amount),
        )
        .await
        .map_err(|_| PaymentError::Gateway("gateway call timed out".to_string()))??;

        let status = match outcome {
            GatewayOutcome::Approved => TransactionStatus::Completed,
            GatewayOutcome::Declined => TransactionStatus::Failed,
        };
        let transaction = self.store.resolve(transaction.id, status).await?;
        tracing::info!(transaction_id = %transaction.id, status = %transaction.status, "transaction resolved");

        if let Err(error) = self.notifier.payment_resolved(&transaction).await {
            metrics::counter!("payment_notifications_failed_total").increment(1);
            tracing::warn!(
                transaction_id = %transaction.id,
                order_id = %transaction.order_id,
                %error,
                "failed to notify order service"
            );
        }

        Ok(transaction)
    }

    /// Loads a transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.store.get(id).await
    }
}
