use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::{info, warn};

use crate::trigger::error::TriggerError;
use crate::trigger::settings::{TriggerSettings, DISPATCH_EVENT};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("videoqueue/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct DispatchRequest<'a> {
    event_type: &'a str,
}

/// The platform accepted the dispatch. The worker has not necessarily started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchAck {
    pub status: u16,
}

/// Sends the `trigger-worker` dispatch event.
///
/// Holds no per-call state; concurrent triggers are independent requests and
/// any de-duplication is up to the platform.
#[derive(Clone)]
pub struct TriggerGateway {
    client: reqwest::Client,
    dispatch_url: String,
    token: String,
    repo_owner: String,
    repo_name: String,
}

impl TriggerGateway {
    /// Validates `settings` up front. Missing token, owner or repository name
    /// yields [`TriggerError::MissingConfig`] before any client exists.
    pub fn new(settings: TriggerSettings) -> Result<Self, TriggerError> {
        let (token, repo_owner, repo_name) = match (
            nonblank(settings.token),
            nonblank(settings.repo_owner),
            nonblank(settings.repo_name),
        ) {
            (Some(t), Some(o), Some(r)) => (t, o, r),
            _ => return Err(TriggerError::MissingConfig),
        };

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let dispatch_url = format!(
            "{}/repos/{}/{}/dispatches",
            settings.api_base.trim_end_matches('/'),
            repo_owner,
            repo_name
        );

        Ok(Self {
            client,
            dispatch_url,
            token,
            repo_owner,
            repo_name,
        })
    }

    pub fn dispatch_url(&self) -> &str {
        &self.dispatch_url
    }

    /// One POST, no retry. Non-2xx answers carry the status and body back.
    pub async fn trigger(&self) -> Result<DispatchAck, TriggerError> {
        let res = self
            .client
            .post(&self.dispatch_url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(&DispatchRequest {
                event_type: DISPATCH_EVENT,
            })
            .send()
            .await
            .map_err(|e| {
                warn!(owner = %self.repo_owner, repo = %self.repo_name, error = %e, "dispatch request failed");
                TriggerError::Transport(e)
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(body) => body,
                Err(e) => unreadable_body(&e),
            };
            warn!(
                owner = %self.repo_owner,
                repo = %self.repo_name,
                status = status.as_u16(),
                "dispatch rejected"
            );
            return Err(TriggerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            owner = %self.repo_owner,
            repo = %self.repo_name,
            event = DISPATCH_EVENT,
            status = status.as_u16(),
            "worker triggered"
        );
        Ok(DispatchAck {
            status: status.as_u16(),
        })
    }
}

fn unreadable_body(err: &dyn std::fmt::Display) -> String {
    format!("<unreadable body: {err}>")
}

fn nonblank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
