//! The order entity and its append-only timeline.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::status::OrderStatus;

/// A single entry in an order's audit trail.
///
/// The timeline is append-only and insertion-ordered; entries are never
/// reordered or pruned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

impl TimelineEvent {
    /// Creates a timeline entry stamped with the current time.
    pub fn now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The product details captured at order time.
///
/// Deliberately decoupled from the live `Product` entity: later price or
/// name changes never retroactively alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: common::ProductId,
    pub name: String,
    pub price: Money,
}

/// A customer purchase request and its evolving fulfillment status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub total_amount: Money,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Money>,
    pub timeline: Vec<TimelineEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Constructs a new order in `Created` state with a snapshot of the
    /// product and a single `"Created"` timeline entry.
    ///
    /// The total is computed from the snapshot price, so
    /// `total_amount == quantity * product.price` holds by construction.
    pub fn create(customer_id: CustomerId, product: &Product, quantity: u32) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            customer_id,
            product: ProductSnapshot {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
            },
            quantity,
            total_amount: product.price.multiply(quantity),
            status: OrderStatus::Created,
            payment_id: None,
            paid_amount: None,
            timeline: vec![TimelineEvent {
                name: OrderStatus::Created.as_str().to_string(),
                timestamp: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the order has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
