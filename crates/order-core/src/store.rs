//! Storage contract for the order service.
//!
//! The trait is deliberately narrow: every mutation that can race across
//! concurrent requests is expressed as a single conditional operation the
//! backing store applies atomically — a compare-and-decrement for stock, a
//! status-keyed conditional update for transitions, a set-based update for
//! the delivery sweep. Read-then-write sequences never guard anything.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};

use crate::error::Result;
use crate::order::Order;
use crate::product::Product;
use crate::status::OrderStatus;

/// Input for order creation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Payment details recorded when a completed payment confirms an order.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// The payment service's transaction id, when the notification carried one.
    pub payment_id: Option<String>,
    pub amount: Money,
}

/// Outcome of a conditional status transition.
#[derive(Debug)]
pub enum Transition {
    /// The order was in the expected status; the transition was applied.
    Applied(Order),
    /// The order exists but was in a different status; nothing changed.
    StatusMismatch { current: OrderStatus },
    /// No order with the given id exists.
    NotFound,
}

/// Storage operations for orders and product stock.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a product into the catalog.
    async fn insert_product(&self, product: Product) -> Result<()>;

    /// Loads a product by id.
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>>;

    /// Atomically checks `stocks >= quantity` and decrements by `quantity`.
    ///
    /// Fails with `InsufficientStock` and performs no mutation when the
    /// check fails. Safe under concurrent callers targeting the same
    /// product: the check and decrement are one store operation.
    async fn reserve_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()>;

    /// Unconditionally increments a product's stock.
    ///
    /// Used to restore stock on cancellation. Failure is reported to the
    /// caller, never swallowed.
    async fn release_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()>;

    /// Creates an order as one atomic group: product lookup, stock check,
    /// order insert, and stock decrement either all commit or none do.
    async fn create_order(&self, new_order: NewOrder) -> Result<Order>;

    /// Loads an order by id.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Lists a customer's orders, newest first.
    async fn orders_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>>;

    /// Applies `from -> to` as a single conditional update keyed on the
    /// current status.
    ///
    /// On success the order's status changes, a timeline entry named after
    /// `to` is appended, `updated_at` is refreshed, and any payment details
    /// are recorded — all in one store operation. Two transition attempts
    /// racing on the same order resolve deterministically: one applies, the
    /// other observes a `StatusMismatch`.
    async fn transition(
        &self,
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        payment: Option<PaymentRecord>,
    ) -> Result<Transition>;

    /// Appends a timeline entry and refreshes `updated_at` without touching
    /// the status. Returns false if the order does not exist.
    async fn append_timeline(&self, order_id: OrderId, entry: &str) -> Result<bool>;

    /// Promotes every `Confirmed` order with `updated_at` older than
    /// `cutoff` to `Delivered` as one set-based update, appending a
    /// `"Delivered"` timeline entry to each. Returns the number promoted.
    ///
    /// Idempotent: a promoted order is no longer `Confirmed`, so overlapping
    /// sweep runs cannot double-apply.
    async fn deliver_confirmed_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
