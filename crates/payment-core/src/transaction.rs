//! The payment transaction entity.

use chrono::{DateTime, Utc};
use common::{Money, TransactionId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment transaction.
///
/// Created `Pending`, resolved exactly once to `Completed` or `Failed`,
/// immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Returns true once the transaction has resolved.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
        }
    }

    /// Parses a status from its storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(TransactionStatus::Pending),
            "Completed" => Some(TransactionStatus::Completed),
            "Failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment attempt record.
///
/// `order_id` is an opaque back-reference into the order service's store —
/// never validated or joined here, only echoed in the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub order_id: String,
    pub amount: Money,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a new pending transaction.
    pub fn pending(order_id: impl Into<String>, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            order_id: order_id.into(),
            amount,
            status: TransactionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_transaction_starts_unresolved() {
        let txn = Transaction::pending("order-1", Money::from_cents(2000));
        assert_eq!(txn.status, TransactionStatus::Pending);
        assert!(!txn.status.is_terminal());
        assert_eq!(txn.created_at, txn.updated_at);
    }

    #[test]
    fn terminal_statuses() {
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
    }

    #[test]
    fn parse_roundtrips_as_str() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::parse("Declined"), None);
    }

    #[test]
    fn serialization_roundtrip() {
        let txn = Transaction::pending("order-1", Money::from_cents(2000));
        let json = serde_json::to_string(&txn).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, txn);
    }
}
