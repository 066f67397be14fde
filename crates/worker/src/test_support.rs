use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connects to TEST_DATABASE_URL, migrates and empties both tables.
/// `None` skips the calling test when the variable is unset.
pub async fn setup_db() -> Option<PgPool> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL missing, skipping");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("failed to connect to TEST_DATABASE_URL");
    videoqueue::db::run_migrations(&pool)
        .await
        .expect("migrations failed");
    sqlx::query("TRUNCATE TABLE video_queue, processed_videos RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("truncate failed");

    Some(pool)
}
