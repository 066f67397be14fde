use sqlx::PgPool;
use uuid::Uuid;
use videoqueue::queue::{QueueError, QueueItem, QueueItemRow, QueueStatus};

/// The worker's side of `video_queue`: the only code that moves an item past
/// `pending`.
#[derive(Clone)]
pub struct QueueLedger {
    pool: PgPool,
}

impl QueueLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claims the oldest pending item and marks it `processing`.
    /// SKIP LOCKED keeps two workers from claiming the same row.
    pub async fn claim_next(&self) -> Result<Option<QueueItem>, QueueError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, QueueItemRow>(
            r#"
            WITH candidate AS (
              SELECT id
              FROM video_queue
              WHERE status = 'pending'
              ORDER BY created_at ASC, seq ASC
              FOR UPDATE SKIP LOCKED
              LIMIT 1
            )
            UPDATE video_queue q
            SET status = 'processing',
                updated_at = now()
            FROM candidate
            WHERE q.id = candidate.id
            RETURNING q.id, q.seq, q.source_url, q.note, q.status, q.error_detail, q.created_at
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        row.map(QueueItemRow::into_item).transpose()
    }

    pub async fn mark_done(&self, id: Uuid) -> Result<bool, QueueError> {
        self.finish(id, QueueStatus::Done, None).await
    }

    pub async fn mark_failed(&self, id: Uuid, detail: &str) -> Result<bool, QueueError> {
        self.finish(id, QueueStatus::Failed, Some(detail)).await
    }

    /// Moves a `processing` item to a terminal state.
    /// Returns false when the row is gone or no longer `processing`
    /// (for example deleted by the operator mid-run).
    async fn finish(
        &self,
        id: Uuid,
        to: QueueStatus,
        detail: Option<&str>,
    ) -> Result<bool, QueueError> {
        let from = QueueStatus::Processing;
        if !from.can_transition_to(to) {
            return Err(QueueError::IllegalTransition { id, from, to });
        }

        let res = sqlx::query(
            r#"
            UPDATE video_queue
            SET status = $2,
                error_detail = $3,
                updated_at = now()
            WHERE id = $1
              AND status = $4
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(detail)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    pub async fn already_processed(&self, video_id: &str) -> Result<bool, QueueError> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT video_id FROM processed_videos WHERE video_id = $1")
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    pub async fn record_processed(&self, video_id: &str) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            INSERT INTO processed_videos (video_id)
            VALUES ($1)
            ON CONFLICT (video_id) DO NOTHING
            "#,
        )
        .bind(video_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
