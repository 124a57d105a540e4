//! Delivery sweeper: promotes confirmed orders to delivered after a dwell
//! period.

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::store::OrderStore;

/// A recurring task that advances `Confirmed` orders to `Delivered` once
/// they have dwelled past a threshold.
///
/// Each pass issues one set-based conditional update, so overlapping runs
/// cannot double-promote an order: a promoted order is no longer
/// `Confirmed` and falls out of the next pass's selection.
pub struct DeliverySweeper<S> {
    store: S,
    interval: Duration,
    dwell: Duration,
}

impl<S: OrderStore> DeliverySweeper<S> {
    /// Creates a sweeper with the given cadence and dwell threshold.
    ///
    /// Both values are configuration, not policy: production deployments
    /// observe a 30-second cadence with a 60-second dwell.
    pub fn new(store: S, interval: Duration, dwell: Duration) -> Self {
        Self {
            store,
            interval,
            dwell,
        }
    }

    /// Runs a single sweep pass and returns the number of orders promoted.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self) -> Result<u64> {
        let cutoff = Utc::now() - self.dwell;
        let delivered = self.store.deliver_confirmed_before(cutoff).await?;

        if delivered > 0 {
            metrics::counter!("orders_delivered_total").increment(delivered);
            tracing::info!(delivered, "promoted confirmed orders to delivered");
        }
        Ok(delivered)
    }

    /// Runs sweep passes forever on a fixed cadence.
    ///
    /// A failed pass is logged and the loop proceeds to the next tick; a
    /// sweep failure is never fatal to the process.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(error) = self.sweep().await {
                tracing::error!(%error, "delivery sweep failed");
            }
        }
    }
}
