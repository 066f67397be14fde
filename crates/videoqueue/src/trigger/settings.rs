use std::fmt;
use std::time::Duration;

use crate::config::{env_nonblank, env_or_fallback};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DISPATCH_EVENT: &str = "trigger-worker";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Inputs for [`TriggerGateway::new`](crate::trigger::TriggerGateway::new).
///
/// The three identifying values stay optional here; the gateway constructor
/// is the single place that decides whether they are sufficient.
#[derive(Clone)]
pub struct TriggerSettings {
    pub token: Option<String>,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            token: None,
            repo_owner: None,
            repo_name: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TriggerSettings {
    pub fn new(
        token: impl Into<String>,
        repo_owner: impl Into<String>,
        repo_name: impl Into<String>,
    ) -> Self {
        Self {
            token: Some(token.into()),
            repo_owner: Some(repo_owner.into()),
            repo_name: Some(repo_name.into()),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let api_base = env_or_fallback("VQ_GITHUB_API_BASE", "GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout = env_nonblank("VQ_TRIGGER_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.clamp(1, 120)))
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            token: env_nonblank("GITHUB_TOKEN"),
            repo_owner: env_nonblank("GITHUB_REPO_OWNER"),
            repo_name: env_nonblank("GITHUB_REPO_NAME"),
            api_base,
            timeout,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Names of the required environment values that are absent or blank.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("GITHUB_TOKEN", &self.token),
            ("GITHUB_REPO_OWNER", &self.repo_owner),
            ("GITHUB_REPO_NAME", &self.repo_name),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
        .map(|(k, _)| k)
        .collect()
    }
}

// keeps the token out of logs
impl fmt::Debug for TriggerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}
