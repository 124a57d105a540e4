//! Payment gateway strategy.
//!
//! The real acquirer integration is out of reach in this codebase; the
//! outcome of a charge is produced by an injected strategy so tests can
//! force deterministic results.

use async_trait::async_trait;
use common::Money;

use crate::error::PaymentError;

/// Outcome of a gateway charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    Approved,
    Declined,
}

/// Trait for resolving the outcome of a payment.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Attempts to charge the given amount for an order.
    async fn resolve(&self, order_id: &str, amount: Money) -> Result<GatewayOutcome, PaymentError>;
}

/// Placeholder gateway approving a fixed share of charges at random.
///
/// A stand-in until a real acquirer integration lands — the approval rate
/// is not a business rule, just a way to exercise both outcomes in a demo
/// deployment.
#[derive(Debug, Clone)]
pub struct RandomGateway {
    approval_rate: f64,
}

impl RandomGateway {
    /// Creates a gateway approving the given share of charges (0.0 to 1.0).
    pub fn new(approval_rate: f64) -> Self {
        Self { approval_rate }
    }
}

impl Default for RandomGateway {
    fn default() -> Self {
        Self::new(0.8)
    }
}

#[async_trait]
impl PaymentGateway for RandomGateway {
    async fn resolve(&self, _order_id: &str, _amount: Money) -> Result<GatewayOutcome, PaymentError> {
        if rand::random::<f64>() < self.approval_rate {
            Ok(GatewayOutcome::Approved)
        } else {
            Ok(GatewayOutcome::Declined)
        }
    }
}

/// Deterministic gateway for tests and local development.
#[derive(Debug, Clone)]
pub struct FixedGateway {
    outcome: GatewayOutcome,
}

impl FixedGateway {
    /// A gateway that approves every charge.
    pub fn approving() -> Self {
        Self {
            outcome: GatewayOutcome::Approved,
        }
    }

    /// A gateway that declines every charge.
    pub fn declining() -> Self {
        Self {
            outcome: GatewayOutcome::Declined,
        }
    }
}

#[async_trait]
impl PaymentGateway for FixedGateway {
    async fn resolve(&self, _order_id: &str, _amount: Money) -> Result<GatewayOutcome, PaymentError> {
        Ok(self.outcome)
    }
}
