//! Payment-service core: the transaction lifecycle and the signed
//! notification protocol toward the order service.
//!
//! The payment service owns `Transaction` exclusively. A transaction is
//! created `Pending`, resolved exactly once to `Completed` or `Failed`, and
//! immutable thereafter. After resolution the service attempts exactly one
//! signed notification to the order service; delivery is best-effort — a
//! lost notification never fails the payment call.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod notifier;
pub mod postgres;
pub mod service;
pub mod store;
pub mod transaction;

pub use error::{PaymentError, Result, StorageError};
pub use gateway::{FixedGateway, GatewayOutcome, PaymentGateway, RandomGateway};
pub use memory::InMemoryTransactionStore;
pub use notifier::{
    HttpOrderNotifier, NotifyError, OrderNotifier, PaymentNotification, RecordingNotifier,
    PAYMENT_UPDATE_PATH,
};
pub use postgres::PostgresTransactionStore;
pub use service::PaymentService;
pub use store::TransactionStore;
pub use transaction::{Transaction, TransactionStatus};
