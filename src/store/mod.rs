//! Subscriber store module
//!
//! Owns the subscriber records and their uniqueness invariant

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::transport::ChatId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One subscriber record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: u64,
    pub chat_id: ChatId,
}

/// Outcome of a create request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Outcome of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Trait for subscriber store implementations
///
/// Implementations guarantee at most one record per chat id and their own
/// internal synchronization; callers impose no additional locking.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Create a record for the identity unless one already exists
    async fn create(&self, chat_id: ChatId) -> Result<CreateOutcome, StoreError>;

    /// Delete the record for the identity if present
    async fn delete(&self, chat_id: ChatId) -> Result<DeleteOutcome, StoreError>;

    /// List every subscriber in insertion order
    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError>;
}
