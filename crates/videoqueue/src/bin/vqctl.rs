use std::env;
use std::io::Read;

use sqlx::PgPool;
use uuid::Uuid;
use videoqueue::config::Config;
use videoqueue::db;
use videoqueue::queue::{PgQueueStore, QueueError, QueueItem, QueueStore, Submission};
use videoqueue::telemetry;
use videoqueue::trigger::{TriggerGateway, TriggerSettings};

const USAGE: &str = "vqctl <command>\n\
Commands:\n\
- add <note> [url...]   (reads urls from stdin, one per line, when none are given)\n\
- list\n\
- delete <item_id>\n\
- trigger\n\
- reset\n\
\n\
Uses DATABASE_URL (or VQ_DATABASE_URL); trigger uses GITHUB_TOKEN, GITHUB_REPO_OWNER, GITHUB_REPO_NAME.\n";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    dotenvy::dotenv().ok();
    telemetry::init_tracing("warn");

    // trigger needs no database
    if args[1] == "trigger" {
        return trigger().await;
    }

    let cfg = Config::from_env()?;
    let pool = db::make_pool(cfg.require_database_url()?).await?;
    if cfg.migrate_on_startup {
        db::run_migrations(&pool).await?;
    }
    let store = PgQueueStore::new(pool.clone());

    match args[1].as_str() {
        "add" => {
            let note = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("usage: vqctl add <note> [url...]"))?;
            let raw = if args.len() > 3 {
                args[3..].join("\n")
            } else {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            };
            add(&store, &raw, note).await?;
        }
        "list" => list(&store).await?,
        "delete" => {
            let id = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("usage: vqctl delete <item_id>"))?;
            let id: Uuid = id.parse()?;
            store.delete(id).await?;
            println!("deleted {id}");
        }
        "reset" => reset(&pool).await?,
        other => {
            eprintln!("Unknown command: {other}\n\n{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn add(store: &PgQueueStore, raw: &str, note: &str) -> anyhow::Result<()> {
    let batch = match Submission::parse(raw, Some(note.to_string())) {
        Ok(batch) => batch,
        Err(QueueError::InvalidLinks(lines)) => {
            eprintln!("The following URLs are not valid video links:");
            for line in &lines {
                eprintln!("  {line}");
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    for item in store.insert(batch).await? {
        println!("+ queued {} id={}", item.source_url, item.id);
    }
    Ok(())
}

async fn list(store: &PgQueueStore) -> anyhow::Result<()> {
    let items = store.list().await?;
    if items.is_empty() {
        println!("Queue is empty");
    }
    for item in &items {
        print_item(item);
    }

    let counts = store.count_by_status().await?;
    println!(
        "\nqueue ({}): pending={} processing={} done={} failed={}",
        counts.total(),
        counts.pending,
        counts.processing,
        counts.done,
        counts.failed
    );
    Ok(())
}

fn print_item(item: &QueueItem) {
    println!(
        "{}  {:<10}  {}  {}",
        item.id,
        item.status.as_str().to_uppercase(),
        item.created_at.format("%Y-%m-%d %H:%M:%S"),
        item.source_url
    );
    if let Some(note) = &item.note {
        println!("    note: {note}");
    }
    if let Some(detail) = &item.error_detail {
        println!("    error: {detail}");
    }
}

async fn trigger() -> anyhow::Result<()> {
    let settings = TriggerSettings::from_env();
    let missing = settings.missing_keys();
    let gateway = TriggerGateway::new(settings)
        .map_err(|e| anyhow::anyhow!("{e} (missing: {})", missing.join(", ")))?;

    let ack = gateway.trigger().await?;
    println!("Worker triggered (upstream status {})", ack.status);
    Ok(())
}

async fn reset(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            video_queue,
            processed_videos
        RESTART IDENTITY
        "#,
    )
    .execute(pool)
    .await?;

    println!("reset OK");
    Ok(())
}
