use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::queue::error::QueueError;
use crate::queue::model::{NewBatch, QueueItem};
use crate::queue::store::QueueStore;

/// Process-local store for development and tests. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryQueueStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    // insertion order
    items: Vec<QueueItem>,
    last_created_at: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Batches get strictly increasing timestamps so a later insert always
    /// lists before an earlier one, even when the clock has not moved.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn insert(&self, batch: NewBatch) -> Result<Vec<QueueItem>, QueueError> {
        let mut state = self.inner.write().await;
        let created_at = state.next_created_at();

        let inserted: Vec<QueueItem> = batch
            .into_items()
            .into_iter()
            .map(|item| QueueItem::pending(Uuid::new_v4(), item, created_at))
            .collect();

        state.items.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn list(&self) -> Result<Vec<QueueItem>, QueueError> {
        let mut items = self.inner.read().await.items.clone();
        // stable: equal timestamps keep insertion order
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn get(&self, id: Uuid) -> Result<Option<QueueItem>, QueueError> {
        let state = self.inner.read().await;
        Ok(state.items.iter().find(|i| i.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), QueueError> {
        let mut state = self.inner.write().await;
        let pos = state
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(QueueError::NotFound(id))?;
        state.items.remove(pos);
        Ok(())
    }
}
