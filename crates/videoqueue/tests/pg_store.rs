// tests/pg_store.rs
mod common;

use common::{setup_db, GANGNAM, RICK, RICK_SHORT};
use serial_test::serial;
use uuid::Uuid;
use videoqueue::queue::{PgQueueStore, QueueError, QueueStatus, QueueStore, Submission};

async fn row_count(store: &PgQueueStore) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM video_queue")
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn batch_insert_is_pending_and_shares_note() {
    let Some(pool) = setup_db().await else { return };
    let store = PgQueueStore::new(pool);

    let batch =
        Submission::parse(&format!("{RICK}\n\n{RICK_SHORT}\n"), Some("cool video".into())).unwrap();
    let items = store.insert(batch).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].source_url, RICK);
    assert_eq!(items[1].source_url, RICK_SHORT);
    assert!(items
        .iter()
        .all(|i| i.status == QueueStatus::Pending && i.note.as_deref() == Some("cool video")));
    assert_eq!(row_count(&store).await, 2);
}

#[tokio::test]
#[serial]
async fn newer_batches_list_first() {
    let Some(pool) = setup_db().await else { return };
    let store = PgQueueStore::new(pool);

    let a = store
        .insert(Submission::parse(&format!("{RICK}\n{GANGNAM}"), None).unwrap())
        .await
        .unwrap();
    let b = store
        .insert(Submission::parse(RICK_SHORT, None).unwrap())
        .await
        .unwrap();

    let listed: Vec<Uuid> = store.list().await.unwrap().iter().map(|i| i.id).collect();
    assert_eq!(listed, vec![b[0].id, a[0].id, a[1].id]);
}

#[tokio::test]
#[serial]
async fn delete_is_exact_and_missing_ids_are_not_found() {
    let Some(pool) = setup_db().await else { return };
    let store = PgQueueStore::new(pool);

    let items = store
        .insert(Submission::parse(&format!("{RICK}\n{GANGNAM}\n{RICK_SHORT}"), None).unwrap())
        .await
        .unwrap();

    store.delete(items[0].id).await.unwrap();
    assert_eq!(row_count(&store).await, 2);
    assert!(store.get(items[0].id).await.unwrap().is_none());
    assert!(store.get(items[1].id).await.unwrap().is_some());

    let err = store.delete(items[0].id).await.unwrap_err();
    assert!(matches!(err, QueueError::NotFound(id) if id == items[0].id));
}

#[tokio::test]
#[serial]
async fn counts_group_by_status() {
    let Some(pool) = setup_db().await else { return };
    let store = PgQueueStore::new(pool.clone());

    let items = store
        .insert(Submission::parse(&format!("{RICK}\n{GANGNAM}"), None).unwrap())
        .await
        .unwrap();

    sqlx::query("UPDATE video_queue SET status = 'failed', error_detail = 'boom' WHERE id = $1")
        .bind(items[0].id)
        .execute(&pool)
        .await
        .unwrap();

    let counts = store.count_by_status().await.unwrap();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.failed, 1);

    let failed = store.get(items[0].id).await.unwrap().unwrap();
    assert_eq!(failed.error_detail.as_deref(), Some("boom"));
}

#[tokio::test]
#[serial]
async fn table_rejects_detail_without_failure() {
    let Some(pool) = setup_db().await else { return };
    let store = PgQueueStore::new(pool.clone());

    let items = store
        .insert(Submission::parse(RICK, None).unwrap())
        .await
        .unwrap();

    let res = sqlx::query("UPDATE video_queue SET status = 'done', error_detail = 'Already processed' WHERE id = $1")
        .bind(items[0].id)
        .execute(&pool)
        .await;
    assert!(res.is_err(), "check constraint should reject detail on a done item");

    let res = sqlx::query("UPDATE video_queue SET status = 'failed' WHERE id = $1")
        .bind(items[0].id)
        .execute(&pool)
        .await;
    assert!(res.is_err(), "check constraint should require detail on a failed item");
}
