use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId};
use tokio::sync::RwLock;

use crate::error::{OrderError, Result};
use crate::order::{Order, TimelineEvent};
use crate::product::Product;
use crate::status::OrderStatus;
use crate::store::{NewOrder, OrderStore, PaymentRecord, Transition};

#[derive(Debug, Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    products: HashMap<ProductId, Product>,
}

/// In-memory order store for testing and single-node deployments.
///
/// Orders and products live under one lock, so the multi-document creation
/// group is trivially atomic and conditional updates cannot interleave.
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Returns the current stock of a product, if it exists.
    pub async fn stock_of(&self, product_id: &ProductId) -> Option<u32> {
        self.inner
            .read()
            .await
            .products
            .get(product_id)
            .map(|p| p.stocks)
    }

    /// Test support: rewinds an order's `updated_at` so sweep thresholds can
    /// be exercised without waiting. Returns false if the order is unknown.
    pub async fn backdate_order(&self, order_id: OrderId, updated_at: DateTime<Utc>) -> bool {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&order_id) {
            Some(order) => {
                order.updated_at = updated_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        Ok(self.inner.read().await.products.get(product_id).cloned())
    }

    async fn reserve_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(product_id)
            .ok_or_else(|| OrderError::ProductNotFound(product_id.clone()))?;

        if product.stocks < quantity {
            return Err(OrderError::InsufficientStock {
                product_id: product_id.clone(),
            });
        }
        product.stocks -= quantity;
        Ok(())
    }

    async fn release_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(product_id)
            .ok_or_else(|| OrderError::ProductNotFound(product_id.clone()))?;
        product.stocks += quantity;
        Ok(())
    }

    async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        // One write guard spans the whole group: lookup, check, insert,
        // decrement. No partial state is ever visible.
        let mut inner = self.inner.write().await;

        let product = inner
            .products
            .get(&new_order.product_id)
            .ok_or_else(|| OrderError::ProductNotFound(new_order.product_id.clone()))?;

        if product.stocks < new_order.quantity {
            return Err(OrderError::InsufficientStock {
                product_id: new_order.product_id.clone(),
            });
        }

        let order = Order::create(new_order.customer_id, product, new_order.quantity);

        let product = inner
            .products
            .get_mut(&new_order.product_id)
            .ok_or_else(|| OrderError::ProductNotFound(new_order.product_id.clone()))?;
        product.stocks -= new_order.quantity;

        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&order_id).cloned())
    }

    async fn orders_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| &o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn transition(
        &self,
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        payment: Option<PaymentRecord>,
    ) -> Result<Transition> {
        let mut inner = self.inner.write().await;
        let Some(order) = inner.orders.get_mut(&order_id) else {
            return Ok(Transition::NotFound);
        };

        if order.status != from {
            return Ok(Transition::StatusMismatch {
                current: order.status,
            });
        }

        order.status = to;
        order.timeline.push(TimelineEvent::now(to.as_str()));
        order.updated_at = Utc::now();
        if let Some(payment) = payment {
            order.payment_id = payment.payment_id;
            order.paid_amount = Some(payment.amount);
        }
        Ok(Transition::Applied(order.clone()))
    }

    async fn append_timeline(&self, order_id: OrderId, entry: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&order_id) {
            Some(order) => {
                order.timeline.push(TimelineEvent::now(entry));
                order.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deliver_confirmed_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let mut delivered = 0;
        for order in inner.orders.values_mut() {
            if order.status == OrderStatus::Confirmed && order.updated_at < cutoff {
                order.status = OrderStatus::Delivered;
                order
                    .timeline
                    .push(TimelineEvent::now(OrderStatus::Delivered.as_str()));
                order.updated_at = Utc::now();
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}
