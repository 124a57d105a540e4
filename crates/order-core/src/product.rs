//! The product entity.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// `stocks` is the only field the order core mutates; it never goes
/// negative. All decrements go through the conditional reservation in the
/// store, never through direct writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stocks: u32,
}

impl Product {
    /// Creates a new product.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stocks: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stocks,
        }
    }
}
