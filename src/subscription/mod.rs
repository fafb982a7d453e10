//! Subscription management
//!
//! Turns raw create/delete requests into idempotent, user-facing outcomes.

use crate::store::{CreateOutcome, DeleteOutcome, SubscriberStore};
use crate::transport::ChatId;
use std::sync::Arc;
use thiserror::Error;

/// User-facing subscription outcomes
///
/// `AlreadyRegistered` and `NotRegistered` are expected domain outcomes;
/// `Internal` hides every unexpected store failure from the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("already registered")]
    AlreadyRegistered,

    #[error("not registered")]
    NotRegistered,

    #[error("subscription backend failed")]
    Internal,
}

/// Idempotent registration front for the subscriber store
pub struct SubscriptionManager {
    store: Arc<dyn SubscriberStore>,
}

impl SubscriptionManager {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self { store }
    }

    /// Register an identity; registering twice yields `AlreadyRegistered`
    pub async fn register(&self, chat_id: ChatId) -> Result<(), SubscriptionError> {
        match self.store.create(chat_id).await {
            Ok(CreateOutcome::Created) => Ok(()),
            Ok(CreateOutcome::AlreadyExists) => Err(SubscriptionError::AlreadyRegistered),
            Err(e) => {
                tracing::error!(chat_id, error = %e, "Subscriber create failed");
                Err(SubscriptionError::Internal)
            }
        }
    }

    /// Remove an identity; removing an unknown one yields `NotRegistered`
    pub async fn unregister(&self, chat_id: ChatId) -> Result<(), SubscriptionError> {
        match self.store.delete(chat_id).await {
            Ok(DeleteOutcome::Deleted) => Ok(()),
            Ok(DeleteOutcome::NotFound) => Err(SubscriptionError::NotRegistered),
            Err(e) => {
                tracing::error!(chat_id, error = %e, "Subscriber delete failed");
                Err(SubscriptionError::Internal)
            }
        }
    }
}
