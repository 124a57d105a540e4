//! Types shared by the order and payment services.
//!
//! Both services speak about the same identifiers and amounts over the wire,
//! but never share a database. Everything in this crate is a plain value with
//! no I/O attached.

pub mod ids;
pub mod money;

pub use ids::{CustomerId, OrderId, ProductId, TransactionId};
pub use money::Money;
