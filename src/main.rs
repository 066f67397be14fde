use std::sync::Arc;

use tracing::{info, warn};
use videoqueue::api::{self, ApiState};
use videoqueue::config::{Config, StoreBackend};
use videoqueue::db;
use videoqueue::queue::{MemoryQueueStore, PgQueueStore, SharedQueueStore};
use videoqueue::telemetry;
use videoqueue::trigger::TriggerGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env()?;
    telemetry::init_tracing("info");

    info!(
        listen_addr = %cfg.listen_addr,
        store = ?cfg.store_backend,
        migrate_on_startup = cfg.migrate_on_startup,
        "videoqueue hub starting"
    );

    let store: SharedQueueStore = match cfg.store_backend {
        StoreBackend::Postgres => {
            let pool = db::make_pool(cfg.require_database_url()?).await?;
            if cfg.migrate_on_startup {
                db::run_migrations(&pool).await?;
            }
            Arc::new(PgQueueStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("using in-memory queue store; items are lost on restart");
            Arc::new(MemoryQueueStore::new())
        }
    };

    let trigger = match TriggerGateway::new(cfg.trigger.clone()) {
        Ok(gateway) => {
            info!(dispatch_url = gateway.dispatch_url(), "worker trigger enabled");
            Some(gateway)
        }
        Err(e) => {
            warn!(missing = ?cfg.trigger.missing_keys(), "worker trigger disabled: {e}");
            None
        }
    };

    let app = api::router(ApiState { store, trigger });

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    info!("admin api listening on http://{}", cfg.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
