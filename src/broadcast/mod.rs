//! Broadcast coordination
//!
//! Assembles the recipient set and rate snapshot for one tick.

use crate::rates::{Rate, RateSource};
use crate::store::SubscriberStore;
use crate::transport::ChatId;
use chrono::{DateTime, Local};
use std::sync::Arc;
use thiserror::Error;

/// Everything one tick needs to fan out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    /// Recipients in the store's returned order
    pub recipients: Vec<ChatId>,
    pub rate: Rate,
}

/// Broadcast preparation failure
///
/// Any dependency failure collapses here; the cause is logged, the tick is
/// skipped, and the next tick starts clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("broadcast dependencies failed")]
pub struct BroadcastFailed;

/// Prepares broadcasts against the rate source and subscriber store
pub struct BroadcastCoordinator {
    store: Arc<dyn SubscriberStore>,
    rates: Arc<dyn RateSource>,
}

impl BroadcastCoordinator {
    pub fn new(store: Arc<dyn SubscriberStore>, rates: Arc<dyn RateSource>) -> Self {
        Self { store, rates }
    }

    /// Fetch the rate and snapshot the subscriber set for one tick
    ///
    /// The rate is fetched first so a dead feed costs no store call. An empty
    /// subscriber list is a success with zero recipients, not a failure.
    pub async fn prepare(&self) -> Result<Broadcast, BroadcastFailed> {
        let rate = self.rates.fetch().await.map_err(|e| {
            tracing::error!(error = %e, "Rate fetch failed");
            BroadcastFailed
        })?;

        let subscribers = self.store.list_all().await.map_err(|e| {
            tracing::error!(error = %e, "Subscriber list failed");
            BroadcastFailed
        })?;

        let recipients: Vec<ChatId> = subscribers.into_iter().map(|s| s.chat_id).collect();

        if recipients.is_empty() {
            tracing::info!("No subscribers found");
        }

        Ok(Broadcast { recipients, rate })
    }
}

/// Render the notification body for one tick
///
/// Selling and buying to 4 decimal places, local hour:minute at broadcast time.
pub fn render_message(rate: &Rate, at: DateTime<Local>) -> String {
    format!(
        "EUR→TRY Selling: {:.4} Buying: {:.4} (at {})",
        rate.selling,
        rate.buying,
        at.format("%H:%M")
    )
}
