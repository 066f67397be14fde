use std::time::Duration;

use tracing::{error, info, warn};
use videoqueue::config::{env_bool, env_nonblank, env_or_fallback};
use videoqueue::db;
use videoqueue::queue::{QueueError, QueueItem, VideoLink};
use videoqueue::telemetry;

mod ledger;
mod processor;
#[cfg(test)]
mod test_support;
use ledger::QueueLedger;
use processor::{CommandProcessor, ProcessError, VideoProcessor};

#[derive(Debug)]
enum ItemOutcome {
    Done,
    Skipped { video_id: String },
    Failed(ProcessError),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("info");

    let once = std::env::args().any(|a| a == "--once");

    let database_url = env_or_fallback("VQ_DATABASE_URL", "DATABASE_URL")
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is missing"))?;
    let worker_id = env_or_fallback("VQ_WORKER_ID", "WORKER_ID")
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "worker-1".to_string());
    let command_line = env_nonblank("VQ_WORKER_COMMAND")
        .ok_or_else(|| anyhow::anyhow!("VQ_WORKER_COMMAND is missing"))?;
    let timeout_secs: u64 = env_nonblank("VQ_WORKER_TIMEOUT_SECS")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1800);
    let migrate_on_startup = env_bool("VQ_MIGRATE_ON_STARTUP").unwrap_or(false);

    let processor = CommandProcessor::from_command_line(
        &command_line,
        Duration::from_secs(timeout_secs.max(1)),
    )
    .ok_or_else(|| anyhow::anyhow!("VQ_WORKER_COMMAND is blank"))?;

    info!(
        worker_id = %worker_id,
        program = processor.program(),
        timeout_secs,
        once,
        "queue worker starting"
    );

    let pool = db::make_pool(&database_url).await?;
    if migrate_on_startup {
        db::run_migrations(&pool).await?;
    }
    let ledger = QueueLedger::new(pool);

    let mut handled = 0usize;
    loop {
        let Some(item) = ledger.claim_next().await? else {
            break;
        };

        info!(worker_id = %worker_id, item_id = %item.id, url = %item.source_url, "processing");
        handle_item(&ledger, &processor, &item).await?;
        handled += 1;

        if once {
            break;
        }
    }

    if handled == 0 {
        info!(worker_id = %worker_id, "no pending videos");
    } else {
        info!(worker_id = %worker_id, handled, "queue drained");
    }
    Ok(())
}

/// Runs one claimed item and writes its terminal state.
/// A store error while running fails the item instead of leaving it `processing`.
async fn handle_item(
    ledger: &QueueLedger,
    processor: &dyn VideoProcessor,
    item: &QueueItem,
) -> anyhow::Result<ItemOutcome> {
    let outcome = match run_item(ledger, processor, item).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(item_id = %item.id, error = %e, "store error while processing");
            ItemOutcome::Failed(ProcessError::new("STORE", e.to_string()))
        }
    };
    record_outcome(ledger, item, &outcome).await?;
    Ok(outcome)
}

async fn run_item(
    ledger: &QueueLedger,
    processor: &dyn VideoProcessor,
    item: &QueueItem,
) -> Result<ItemOutcome, QueueError> {
    let Some(link) = VideoLink::parse(&item.source_url) else {
        return Ok(ItemOutcome::Failed(ProcessError::new(
            "BAD_LINK",
            "could not extract video id from url",
        )));
    };

    if ledger.already_processed(link.video_id()).await? {
        return Ok(ItemOutcome::Skipped {
            video_id: link.video_id().to_string(),
        });
    }

    match processor.process(item).await {
        Ok(()) => {
            ledger.record_processed(link.video_id()).await?;
            Ok(ItemOutcome::Done)
        }
        Err(e) => Ok(ItemOutcome::Failed(e)),
    }
}

async fn record_outcome(
    ledger: &QueueLedger,
    item: &QueueItem,
    outcome: &ItemOutcome,
) -> anyhow::Result<()> {
    let updated = match outcome {
        ItemOutcome::Done => {
            info!(item_id = %item.id, status = "done", "processed");
            ledger.mark_done(item.id).await?
        }
        ItemOutcome::Skipped { video_id } => {
            info!(item_id = %item.id, video_id = %video_id, status = "done", "already processed, skipping");
            ledger.mark_done(item.id).await?
        }
        ItemOutcome::Failed(e) => {
            error!(item_id = %item.id, code = e.code, error = %e.message.trim(), status = "failed", "processing failed");
            ledger.mark_failed(item.id, &e.detail()).await?
        }
    };

    if !updated {
        warn!(item_id = %item.id, "item left processing before it finished; outcome not recorded");
    }
    Ok(())
}
