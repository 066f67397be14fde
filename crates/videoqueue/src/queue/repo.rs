// crates/videoqueue/src/queue/repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::queue::error::QueueError;
use crate::queue::model::{NewBatch, QueueItem, QueueStatus, StatusCounts};
use crate::queue::store::QueueStore;

pub(crate) const ITEM_COLUMNS: &str =
    "id, seq, source_url, note, status, error_detail, created_at";

/// Raw `video_queue` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueueItemRow {
    pub id: Uuid,
    pub seq: i64,
    pub source_url: String,
    pub note: Option<String>,
    pub status: String,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QueueItemRow {
    pub fn into_item(self) -> Result<QueueItem, QueueError> {
        let status = QueueStatus::parse(&self.status).ok_or_else(|| {
            QueueError::Corrupt(format!("item {} has unknown status {:?}", self.id, self.status))
        })?;

        Ok(QueueItem::from_stored(
            self.id,
            self.source_url,
            self.note,
            status,
            self.created_at,
            self.error_detail,
        ))
    }
}

fn into_items(rows: Vec<QueueItemRow>) -> Result<Vec<QueueItem>, QueueError> {
    rows.into_iter().map(QueueItemRow::into_item).collect()
}

#[derive(Clone)]
pub struct PgQueueStore {
    pool: PgPool,
}

impl PgQueueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl QueueStore for PgQueueStore {
    /// One multi-row INSERT inside a transaction: the batch lands whole or not at all.
    /// `created_at` defaults to `now()`, which is the transaction start, so the
    /// batch shares one timestamp and `seq` keeps its order.
    async fn insert(&self, batch: NewBatch) -> Result<Vec<QueueItem>, QueueError> {
        let mut tx = self.pool.begin().await?;

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO video_queue (id, source_url, note, status) ");
        qb.push_values(batch.into_items(), |mut row, item| {
            row.push_bind(Uuid::new_v4())
                .push_bind(item.source_url().to_string())
                .push_bind(item.note().map(str::to_string))
                .push_bind(QueueStatus::Pending.as_str());
        });
        qb.push(" RETURNING ");
        qb.push(ITEM_COLUMNS);

        let mut rows: Vec<QueueItemRow> = qb.build_query_as().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        rows.sort_by_key(|r| r.seq);
        into_items(rows)
    }

    /// `seq` only breaks ties inside one batch. Newer batches listing first
    /// relies on `now()` (transaction start) being strictly greater for a
    /// transaction that starts after the previous insert committed.
    async fn list(&self) -> Result<Vec<QueueItem>, QueueError> {
        let rows = sqlx::query_as::<_, QueueItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM video_queue ORDER BY created_at DESC, seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_items(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<QueueItem>, QueueError> {
        let row = sqlx::query_as::<_, QueueItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM video_queue WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QueueItemRow::into_item).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<(), QueueError> {
        let res = sqlx::query("DELETE FROM video_queue WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(QueueError::NotFound(id));
        }
        Ok(())
    }

    async fn count_by_status(&self) -> Result<StatusCounts, QueueError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT status, COUNT(*)::BIGINT
            FROM video_queue
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            let status = QueueStatus::parse(&status)
                .ok_or_else(|| QueueError::Corrupt(format!("unknown status {status:?}")))?;
            counts.add(status, n);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, detail: Option<&str>) -> QueueItemRow {
        QueueItemRow {
            id: Uuid::new_v4(),
            seq: 1,
            source_url: "https://youtu.be/dQw4w9WgXcQ".into(),
            note: Some("n".into()),
            status: status.into(),
            error_detail: detail.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn decodes_known_statuses() {
        let item = row("failed", Some("boom")).into_item().unwrap();
        assert_eq!(item.status, QueueStatus::Failed);
        assert_eq!(item.error_detail.as_deref(), Some("boom"));

        let item = row("pending", None).into_item().unwrap();
        assert_eq!(item.status, QueueStatus::Pending);
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let err = row("succeeded", None).into_item().unwrap_err();
        assert!(matches!(err, QueueError::Corrupt(_)));
    }
}
