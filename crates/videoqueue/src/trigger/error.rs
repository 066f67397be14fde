use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    /// Token, owner or repository name is not configured. No request is made.
    #[error("Missing server configuration")]
    MissingConfig,

    /// The platform answered with a non-success status.
    #[error("GitHub API error: {status} {body}")]
    Upstream { status: u16, body: String },

    /// The request never got an answer (connect failure, timeout, ...).
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl TriggerError {
    pub fn is_config(&self) -> bool {
        matches!(self, TriggerError::MissingConfig)
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            TriggerError::Upstream { status, .. } => Some(*status),
            TriggerError::Transport(e) => e.status().map(|s| s.as_u16()),
            TriggerError::MissingConfig => None,
        }
    }
}
