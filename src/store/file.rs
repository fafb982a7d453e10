//! JSON-file-backed subscriber store

use super::memory::Rows;
use super::{CreateOutcome, DeleteOutcome, StoreError, Subscriber, SubscriberStore};
use crate::transport::ChatId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// On-disk snapshot format
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Subscriber store persisted as a JSON snapshot
///
/// The snapshot is loaded once at open; reads are served from memory and every
/// successful mutation rewrites the file while the write lock is held, so the
/// snapshot never lags the in-memory rows.
pub struct FileStore {
    path: PathBuf,
    rows: Arc<RwLock<Rows>>,
}

impl FileStore {
    /// Open the store, loading the snapshot at `path` if one exists
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let rows = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                Rows {
                    next_id: snapshot.next_id,
                    subscribers: snapshot.subscribers,
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Rows::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            path = %path.display(),
            subscribers = rows.subscribers.len(),
            "Subscriber store opened"
        );

        Ok(Self {
            path,
            rows: Arc::new(RwLock::new(rows)),
        })
    }

    async fn persist(&self, rows: &Rows) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            next_id: rows.next_id,
            subscribers: rows.subscribers.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for FileStore {
    async fn create(&self, chat_id: ChatId) -> Result<CreateOutcome, StoreError> {
        let mut rows = self.rows.write().await;
        let outcome = rows.create(chat_id);
        if outcome == CreateOutcome::Created {
            self.persist(&rows).await?;
        }
        Ok(outcome)
    }

    async fn delete(&self, chat_id: ChatId) -> Result<DeleteOutcome, StoreError> {
        let mut rows = self.rows.write().await;
        let outcome = rows.delete(chat_id);
        if outcome == DeleteOutcome::Deleted {
            self.persist(&rows).await?;
        }
        Ok(outcome)
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.subscribers.clone())
    }
}
