// crates/videoqueue/src/api/models.rs
use serde::{Deserialize, Serialize};

use crate::queue::{QueueItem, StatusCounts};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQueueResponse {
    pub items: Vec<QueueItem>,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub inserted: usize,
    pub items: Vec<QueueItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

impl TriggerResponse {
    pub fn triggered() -> Self {
        Self {
            success: true,
            message: "Worker triggered".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_lines: Vec<String>,
}
