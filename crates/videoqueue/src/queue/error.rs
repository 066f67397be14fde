use thiserror::Error;
use uuid::Uuid;

use crate::queue::model::QueueStatus;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no video links were submitted")]
    EmptyBatch,

    /// Every offending line, trimmed, in submission order.
    #[error("the following links are not valid video links: {}", .0.join(", "))]
    InvalidLinks(Vec<String>),

    #[error("queue item {0} not found")]
    NotFound(Uuid),

    #[error("queue item {id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: Uuid,
        from: QueueStatus,
        to: QueueStatus,
    },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("corrupt queue row: {0}")]
    Corrupt(String),
}

impl QueueError {
    /// True for errors caused by the submitted input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, QueueError::EmptyBatch | QueueError::InvalidLinks(_))
    }

    pub fn invalid_lines(&self) -> &[String] {
        match self {
            QueueError::InvalidLinks(lines) => lines,
            _ => &[],
        }
    }
}
