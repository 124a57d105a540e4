//! Order service: the creation transactor and the lifecycle transition
//! operations driven by cancellation and payment callbacks.

use common::OrderId;

use crate::error::{OrderError, Result};
use crate::order::Order;
use crate::status::OrderStatus;
use crate::store::{NewOrder, OrderStore, PaymentRecord, Transition};

/// High-level API over an [`OrderStore`].
///
/// Owns the lifecycle rules: which transitions are legal, which side effects
/// (stock mutation) each one carries, and how duplicate payment
/// notifications are absorbed.
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an order as one atomic unit: product lookup, stock check,
    /// total computation, order persistence, and stock decrement.
    #[tracing::instrument(skip(self, new_order), fields(customer_id = %new_order.customer_id, product_id = %new_order.product_id))]
    pub async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        if new_order.quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }

        let order = self.store.create_order(new_order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");
        Ok(order)
    }

    /// Loads an order by id.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.store.get_order(order_id).await
    }

    /// Lists a customer's orders, newest first.
    pub async fn orders_for_customer(
        &self,
        customer_id: &common::CustomerId,
    ) -> Result<Vec<Order>> {
        self.store.orders_for_customer(customer_id).await
    }

    /// Cancels an order that is still in `Created` and restores its stock.
    ///
    /// The conditional `Created -> Cancelled` update decides the race: only
    /// the winner releases stock, so a cancel racing a confirmation can
    /// never double-release or release after a payment landed.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let transition = self
            .store
            .transition(order_id, OrderStatus::Created, OrderStatus::Cancelled, None)
            .await?;

        match transition {
            Transition::Applied(order) => {
                self.store
                    .release_stock(&order.product.id, order.quantity)
                    .await?;
                metrics::counter!("orders_cancelled_total").increment(1);
                tracing::info!(order_id = %order.id, quantity = order.quantity, "order cancelled, stock released");
                Ok(order)
            }
            Transition::StatusMismatch { .. } => Err(OrderError::NotCancellable(order_id)),
            Transition::NotFound => Err(OrderError::OrderNotFound(order_id)),
        }
    }

    /// Applies a "payment completed" notification: `Created -> Confirmed`
    /// plus the payment details.
    ///
    /// Idempotent under duplicate delivery: an order that already moved past
    /// `Created` on the payment path returns successfully without appending
    /// a second timeline entry. A completed payment for a `Cancelled` order
    /// is a conflict and is surfaced as such.
    #[tracing::instrument(skip(self, payment))]
    pub async fn confirm_payment(&self, order_id: OrderId, payment: PaymentRecord) -> Result<Order> {
        let transition = self
            .store
            .transition(
                order_id,
                OrderStatus::Created,
                OrderStatus::Confirmed,
                Some(payment),
            )
            .await?;

        match transition {
            Transition::Applied(order) => {
                metrics::counter!("payment_callbacks_total", "outcome" => "confirmed").increment(1);
                tracing::info!(order_id = %order.id, "order confirmed");
                Ok(order)
            }
            Transition::StatusMismatch {
                current: current @ (OrderStatus::Confirmed | OrderStatus::Delivered),
            } => {
                metrics::counter!("payment_callbacks_total", "outcome" => "duplicate").increment(1);
                tracing::info!(%order_id, %current, "duplicate payment confirmation ignored");
                self.store
                    .get_order(order_id)
                    .await?
                    .ok_or(OrderError::OrderNotFound(order_id))
            }
            Transition::StatusMismatch { current } => Err(OrderError::InvalidTransition {
                order_id,
                current,
                requested: OrderStatus::Confirmed,
            }),
            Transition::NotFound => Err(OrderError::OrderNotFound(order_id)),
        }
    }

    /// Records a failed payment attempt.
    ///
    /// The status does not move: the order stays `Created`, open for retry
    /// or cancellation. Only a timeline entry and `updated_at` change.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment_failure(&self, order_id: OrderId) -> Result<()> {
        let found = self.store.append_timeline(order_id, "Payment Failed").await?;
        if !found {
            return Err(OrderError::OrderNotFound(order_id));
        }
        metrics::counter!("payment_callbacks_total", "outcome" => "failed").increment(1);
        tracing::info!(%order_id, "payment failure recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryOrderStore;
    use crate::product::Product;
    use common::{CustomerId, Money, ProductId};

    async fn service_with_stock(stocks: u32) -> OrderService<InMemoryOrderStore> {
        let store = InMemoryOrderStore::new();
        store
            .insert_product(Product::new(
                ProductId::new("SKU-001"),
                "Laptop",
                Money::from_cents(1000),
                stocks,
            ))
            .await
            .unwrap();
        OrderService::new(store)
    }

    fn new_order(quantity: u32) -> NewOrder {
        NewOrder {
            customer_id: CustomerId::new("alice@example.com"),
            product_id: ProductId::new("SKU-001"),
            quantity,
        }
    }

    fn payment(amount: Money) -> PaymentRecord {
        PaymentRecord {
            payment_id: Some("txn-1".to_string()),
            amount,
        }
    }

    #[tokio::test]
    async fn create_order_computes_total_and_reserves_stock() {
        let service = service_with_stock(10).await;

        let order = service.create_order(new_order(2)).await.unwrap();

        assert_eq!(order.total_amount, Money::from_cents(2000));
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(
            service.store().stock_of(&ProductId::new("SKU-001")).await,
            Some(8)
        );
    }

    #[tokio::test]
    async fn create_order_rejects_zero_quantity() {
        let service = service_with_stock(10).await;
        let result = service.create_order(new_order(0)).await;
        assert!(matches!(result, Err(OrderError::InvalidQuantity)));
    }

    #[tokio::test]
    async fn cancel_restores_stock() {
        let service = service_with_stock(10).await;
        let order = service.create_order(new_order(4)).await.unwrap();
        assert_eq!(
            service.store().stock_of(&ProductId::new("SKU-001")).await,
            Some(6)
        );

        let cancelled = service.cancel_order(order.id).await.unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.timeline.last().unwrap().name, "Cancelled");
        assert_eq!(
            service.store().stock_of(&ProductId::new("SKU-001")).await,
            Some(10)
        );
    }

    #[tokio::test]
    async fn cancel_confirmed_order_is_rejected_without_stock_change() {
        let service = service_with_stock(10).await;
        let order = service.create_order(new_order(4)).await.unwrap();
        service
            .confirm_payment(order.id, payment(order.total_amount))
            .await
            .unwrap();

        let result = service.cancel_order(order.id).await;

        assert!(matches!(result, Err(OrderError::NotCancellable(_))));
        assert_eq!(
            service.store().stock_of(&ProductId::new("SKU-001")).await,
            Some(6)
        );
    }

    #[tokio::test]
    async fn cancel_twice_fails_and_releases_once() {
        let service = service_with_stock(10).await;
        let order = service.create_order(new_order(4)).await.unwrap();

        service.cancel_order(order.id).await.unwrap();
        let result = service.cancel_order(order.id).await;

        assert!(matches!(result, Err(OrderError::NotCancellable(_))));
        assert_eq!(
            service.store().stock_of(&ProductId::new("SKU-001")).await,
            Some(10)
        );
    }

    #[tokio::test]
    async fn cancel_unknown_order_is_not_found() {
        let service = service_with_stock(10).await;
        let result = service.cancel_order(OrderId::new()).await;
        assert!(matches!(result, Err(OrderError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn confirm_payment_transitions_and_records_details() {
        let service = service_with_stock(10).await;
        let order = service.create_order(new_order(2)).await.unwrap();

        let confirmed = service
            .confirm_payment(order.id, payment(order.total_amount))
            .await
            .unwrap();

        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.payment_id.as_deref(), Some("txn-1"));
        assert_eq!(confirmed.paid_amount, Some(order.total_amount));
        assert_eq!(
            confirmed.timeline.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["Created", "Confirmed"]
        );
    }

    #[tokio::test]
    async fn confirm_payment_twice_is_idempotent() {
        let service = service_with_stock(10).await;
        let order = service.create_order(new_order(2)).await.unwrap();

        let first = service
            .confirm_payment(order.id, payment(order.total_amount))
            .await
            .unwrap();
        let second = service
            .confirm_payment(order.id, payment(order.total_amount))
            .await
            .unwrap();

        assert_eq!(second.status, OrderStatus::Confirmed);
        assert_eq!(second.timeline.len(), first.timeline.len());
        assert_eq!(second.payment_id, first.payment_id);
    }

    #[tokio::test]
    async fn confirm_payment_on_cancelled_order_is_a_conflict() {
        let service = service_with_stock(10).await;
        let order = service.create_order(new_order(2)).await.unwrap();
        service.cancel_order(order.id).await.unwrap();

        let result = service
            .confirm_payment(order.id, payment(order.total_amount))
            .await;

        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                current: OrderStatus::Cancelled,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn confirm_payment_unknown_order_is_not_found() {
        let service = service_with_stock(10).await;
        let result = service
            .confirm_payment(OrderId::new(), payment(Money::from_cents(100)))
            .await;
        assert!(matches!(result, Err(OrderError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn payment_failure_leaves_order_open() {
        let service = service_with_stock(10).await;
        let order = service.create_order(new_order(1)).await.unwrap();

        service.record_payment_failure(order.id).await.unwrap();

        let stored = service.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Created);
        assert_eq!(stored.timeline.last().unwrap().name, "Payment Failed");
        assert!(stored.payment_id.is_none());

        // Still cancellable after a failed payment.
        let cancelled = service.cancel_order(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn concurrent_reservations_never_oversell() {
        let service = std::sync::Arc::new(service_with_stock(10).await);

        let mut handles = Vec::new();
        for _ in 0..25 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.create_order(new_order(1)).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 10);
        assert_eq!(
            service.store().stock_of(&ProductId::new("SKU-001")).await,
            Some(0)
        );
        assert_eq!(service.store().order_count().await, 10);
    }

    #[tokio::test]
    async fn concurrent_confirmations_apply_once() {
        let service = std::sync::Arc::new(service_with_stock(10).await);
        let order = service.create_order(new_order(1)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            let total = order.total_amount;
            let id = order.id;
            handles.push(tokio::spawn(async move {
                service.confirm_payment(id, payment(total)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = service.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.timeline.len(), 2);
    }
}
