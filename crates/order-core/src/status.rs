//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Legal transitions:
/// ```text
/// Created ──┬──► Confirmed ──► Delivered
///           └──► Cancelled
/// ```
///
/// `Cancelled` and `Delivered` are terminal. A failed payment never moves
/// the status — the order stays `Created`, open for retry or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order persisted and stock reserved, awaiting payment.
    #[default]
    Created,

    /// Payment completed, awaiting delivery.
    Confirmed,

    /// Order was cancelled and its stock released (terminal state).
    Cancelled,

    /// Order has been delivered (terminal state).
    Delivered,
}

impl OrderStatus {
    /// Returns true if `next` is a legal transition target from this status.
    pub fn allows(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Created, OrderStatus::Confirmed)
                | (OrderStatus::Created, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Delivered)
        )
    }

    /// Returns true if the order can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Delivered)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// Parses a status from its storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Created" => Some(OrderStatus::Created),
            "Confirmed" => Some(OrderStatus::Confirmed),
            "Cancelled" => Some(OrderStatus::Cancelled),
            "Delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_created() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }

    #[test]
    fn created_allows_confirm_and_cancel() {
        assert!(OrderStatus::Created.allows(OrderStatus::Confirmed));
        assert!(OrderStatus::Created.allows(OrderStatus::Cancelled));
        assert!(!OrderStatus::Created.allows(OrderStatus::Delivered));
    }

    #[test]
    fn confirmed_allows_only_delivery() {
        assert!(OrderStatus::Confirmed.allows(OrderStatus::Delivered));
        assert!(!OrderStatus::Confirmed.allows(OrderStatus::Cancelled));
        assert!(!OrderStatus::Confirmed.allows(OrderStatus::Created));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for terminal in [OrderStatus::Cancelled, OrderStatus::Delivered] {
            for next in [
                OrderStatus::Created,
                OrderStatus::Confirmed,
                OrderStatus::Cancelled,
                OrderStatus::Delivered,
            ] {
                assert!(!terminal.allows(next));
            }
        }
    }

    #[test]
    fn only_created_can_cancel() {
        assert!(OrderStatus::Created.can_cancel());
        assert!(!OrderStatus::Confirmed.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
    }

    #[test]
    fn terminal_states() {
        assert!(!OrderStatus::Created.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn parse_roundtrips_as_str() {
        for status in [
            OrderStatus::Created,
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
            OrderStatus::Delivered,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("Shipped"), None);
    }

    #[test]
    fn serializes_as_plain_name() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
        assert_eq!(json, "\"Confirmed\"");
    }
}
