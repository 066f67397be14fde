use crate::trigger::TriggerSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" | "postgresql" => Some(Self::Postgres),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

// Typed runtime configuration, loaded once from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub listen_addr: String,
    pub migrate_on_startup: bool,
    pub trigger: TriggerSettings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend = match env_nonblank("VQ_STORE") {
            Some(raw) => StoreBackend::parse(&raw)
                .ok_or_else(|| anyhow::anyhow!("VQ_STORE must be postgres or memory, got {raw:?}"))?,
            None => StoreBackend::Postgres,
        };

        let database_url = env_or_fallback("VQ_DATABASE_URL", "DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is missing");
        }

        let listen_addr = env_or_fallback("VQ_LISTEN_ADDR", "LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string());

        let migrate_on_startup = env_bool("VQ_MIGRATE_ON_STARTUP").unwrap_or(false);

        Ok(Self {
            database_url,
            store_backend,
            listen_addr,
            migrate_on_startup,
            trigger: TriggerSettings::from_env(),
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is missing"))
    }
}

pub fn env_nonblank(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

pub fn env_or_fallback(primary: &str, fallback: &str) -> Option<String> {
    env_nonblank(primary).or_else(|| env_nonblank(fallback))
}

pub fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|v| parse_bool(&v))
}

pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
