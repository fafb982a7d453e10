//! In-memory subscriber store

use super::{CreateOutcome, DeleteOutcome, StoreError, Subscriber, SubscriberStore};
use crate::transport::ChatId;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub(super) struct Rows {
    pub next_id: u64,
    pub subscribers: Vec<Subscriber>,
}

impl Rows {
    pub fn create(&mut self, chat_id: ChatId) -> CreateOutcome {
        if self.subscribers.iter().any(|s| s.chat_id == chat_id) {
            return CreateOutcome::AlreadyExists;
        }
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id: self.next_id,
            chat_id,
        });
        CreateOutcome::Created
    }

    pub fn delete(&mut self, chat_id: ChatId) -> DeleteOutcome {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.chat_id != chat_id);
        if self.subscribers.len() == before {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted
        }
    }
}

/// Subscriber store without persistence
///
/// Backs ephemeral runs and tests; the file store layers a snapshot on top of
/// the same row semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<Rows>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn create(&self, chat_id: ChatId) -> Result<CreateOutcome, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.create(chat_id))
    }

    async fn delete(&self, chat_id: ChatId) -> Result<DeleteOutcome, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.delete(chat_id))
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.subscribers.clone())
    }
}
