//! Signed notification of payment outcomes toward the order service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::{Money, TransactionId};
use serde::{Deserialize, Serialize};
use signer::RequestSigner;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::transaction::{Transaction, TransactionStatus};

/// Path of the order service's callback endpoint; part of the signed bytes.
pub const PAYMENT_UPDATE_PATH: &str = "/backend/payment-update";

/// Wire payload of a payment-update notification.
///
/// `transaction_id` lets the order service record which payment confirmed
/// the order; the signature covers the exact serialized bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status: TransactionStatus,
    pub amount: Money,
    pub transaction_id: TransactionId,
}

impl PaymentNotification {
    /// Builds the notification for a resolved transaction.
    pub fn for_transaction(transaction: &Transaction) -> Self {
        Self {
            order_id: transaction.order_id.clone(),
            status: transaction.status,
            amount: transaction.amount,
            transaction_id: transaction.id,
        }
    }
}

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The order service could not be reached.
    #[error("failed to reach order service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The order service answered with a non-success status.
    #[error("order service rejected the notification: status {0}")]
    Rejected(reqwest::StatusCode),

    /// The payload could not be encoded.
    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Trait for delivering payment outcomes to the order service.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Sends exactly one notification for a resolved transaction.
    async fn payment_resolved(&self, transaction: &Transaction) -> Result<(), NotifyError>;
}

/// HTTP notifier that signs each request with the shared secret.
///
/// The client carries a request timeout so a slow order service cannot pin
/// a payment worker.
pub struct HttpOrderNotifier {
    client: reqwest::Client,
    base_url: String,
    signer: RequestSigner,
}

impl HttpOrderNotifier {
    /// Creates a notifier targeting the order service at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        signer: RequestSigner,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            signer,
        })
    }
}

#[async_trait]
impl OrderNotifier for HttpOrderNotifier {
    async fn payment_resolved(&self, transaction: &Transaction) -> Result<(), NotifyError> {
        let payload = PaymentNotification::for_transaction(transaction);
        // The signature is computed over the exact bytes sent, so the body
        // is serialized once and reused.
        let body = serde_json::to_vec(&payload)?;

        let timestamp = Utc::now();
        let signature = self
            .signer
            .sign("POST", PAYMENT_UPDATE_PATH, &body, timestamp);

        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            PAYMENT_UPDATE_PATH
        );

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(signer::SIGNATURE_HEADER, signature)
            .header(signer::TIMESTAMP_HEADER, timestamp.to_rfc3339())
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status()));
        }
        Ok(())
    }
}

/// In-memory notifier for testing: records every notification and can be
/// told to fail delivery.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<PaymentNotification>>>,
    fail: Arc<std::sync::atomic::AtomicBool>,
}

impl RecordingNotifier {
    /// Creates a new recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail every delivery.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Returns the notifications recorded so far.
    pub async fn sent(&self) -> Vec<PaymentNotification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn payment_resolved(&self, transaction: &Transaction) -> Result<(), NotifyError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(NotifyError::Rejected(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ));
        }
        self.sent
            .write()
            .await
            .push(PaymentNotification::for_transaction(transaction));
        Ok(())
    }
}
