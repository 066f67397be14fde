use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::queue::error::QueueError;
use crate::queue::model::{NewBatch, QueueItem, StatusCounts};

pub type SharedQueueStore = Arc<dyn QueueStore>;

/// Durable collection of queue items.
///
/// Nothing here writes `status` or `error_detail` after insert; the drain
/// worker owns those columns.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Appends the whole batch atomically, every item `pending`.
    /// Returns the new items in submission order.
    async fn insert(&self, batch: NewBatch) -> Result<Vec<QueueItem>, QueueError>;

    /// All items, newest first; items of one batch keep submission order.
    async fn list(&self) -> Result<Vec<QueueItem>, QueueError>;

    async fn get(&self, id: Uuid) -> Result<Option<QueueItem>, QueueError>;

    /// Fails with [`QueueError::NotFound`] when no item has `id`.
    async fn delete(&self, id: Uuid) -> Result<(), QueueError>;

    async fn count_by_status(&self) -> Result<StatusCounts, QueueError> {
        let items = self.list().await?;
        Ok(StatusCounts::from_items(&items))
    }
}
